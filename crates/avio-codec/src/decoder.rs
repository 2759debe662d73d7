//! 上游解码器接口定义.
//!
//! 读会话通过 `MediaDecoder` 驱动真正的解码实现. 实现者持有底层原生句柄
//! (已打开的文件/流、解码上下文), 并在 `Drop` 中释放; 读会话独占一个实现者,
//! 因此句柄恰好释放一次.

use avio_core::{AvResult, Rational};

use crate::frame::Frame;
use crate::stream::Stream;

/// 上游解码器 trait
///
/// 使用流程:
/// 1. 构造实现者 (打开输入、探测流)
/// 2. 通过 `video_stream()` / `audio_stream()` 查询流信息
/// 3. 循环调用 `decode_one()` 取出解码单元, 视频与音频按上游顺序交错产出
/// 4. 可选: 调用 `seek()` 定位
pub trait MediaDecoder: Send {
    /// 获取解码器名称 (通常为输入的 MRL)
    fn name(&self) -> &str;

    /// 视频流信息, 没有视频流时返回 `None`
    fn video_stream(&self) -> Option<&Stream>;

    /// 音频流信息, 没有音频流时返回 `None`
    fn audio_stream(&self) -> Option<&Stream>;

    /// 是否存在视频流
    fn has_video(&self) -> bool {
        self.video_stream().is_some()
    }

    /// 是否存在音频流
    fn has_audio(&self) -> bool {
        self.audio_stream().is_some()
    }

    /// 容器报告的总时长 (原始刻度, 按视频流时间基解释; `NOPTS_VALUE` 表示未知)
    fn duration(&self) -> i64;

    /// 容器层的全局时间基, `seek()` 的参数以此为单位
    fn container_time_base(&self) -> Rational {
        Rational::MICRO
    }

    /// 解码下一个单元
    ///
    /// 阻塞直到得到一个视频帧或音频块.
    ///
    /// # 返回
    /// - `Ok(frame)`: 成功解码一个单元
    /// - `Err(AvError::Eof)`: 已到达输入末尾
    /// - `Err(AvError::Decode(_))`: 解码失败
    fn decode_one(&mut self) -> AvResult<Frame>;

    /// 定位到指定时间点
    ///
    /// # 参数
    /// - `timestamp`: 目标时间戳 (以 `container_time_base()` 为单位)
    fn seek(&mut self, timestamp: i64) -> AvResult<()>;
}
