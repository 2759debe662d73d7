//! 上游编码器接口定义.
//!
//! 写会话把转换好的视频帧和定长音频帧交给 `MediaEncoder`. 实现者持有
//! 输出文件与编码上下文, 由写会话独占并在会话结束时调用一次 `finish()`.

use avio_core::{AvResult, PixelFormat, SampleFormat};

use crate::frame::{AudioFrame, VideoFrame};

/// 上游编码器 trait
///
/// 使用流程:
/// 1. 构造实现者 (打开输出、写入容器头部)
/// 2. 交错调用 `encode_video()` / `encode_audio()`
/// 3. 调用 `finish()` 写入容器尾部
pub trait MediaEncoder: Send {
    /// 获取编码器名称 (通常为输出的 MRL)
    fn name(&self) -> &str;

    /// 视频编码器要求的输入像素格式
    fn pixel_format(&self) -> PixelFormat {
        PixelFormat::Yuv420p
    }

    /// 音频编码器要求的输入采样格式
    fn sample_format(&self) -> SampleFormat {
        SampleFormat::S16
    }

    /// 音频编码器每帧要求的每声道采样数, 未启用音频时为 0
    fn frame_size(&self) -> u32;

    /// 音频声道数, 未启用音频时为 0
    fn channels(&self) -> u32;

    /// 编码一帧视频
    ///
    /// 帧的像素格式和分辨率已经与编码器要求一致.
    fn encode_video(&mut self, frame: &VideoFrame) -> AvResult<()>;

    /// 编码一帧音频
    ///
    /// 帧的每声道采样数恰好等于 `frame_size()`.
    fn encode_audio(&mut self, frame: &AudioFrame) -> AvResult<()>;

    /// 结束编码, 写入容器尾部
    fn finish(&mut self) -> AvResult<()>;
}
