//! 流信息定义.
//!
//! 描述上游输入中的一路视频流或音频流.

use avio_core::{ChannelLayout, MediaType, NOPTS_VALUE, PixelFormat, Rational, SampleFormat};

use crate::codec_id::CodecId;

/// 流信息
#[derive(Debug, Clone)]
pub struct Stream {
    /// 流索引 (在容器中的位置, 从 0 开始)
    pub index: usize,
    /// 媒体类型
    pub media_type: MediaType,
    /// 编解码器标识
    pub codec_id: CodecId,
    /// 时间基
    pub time_base: Rational,
    /// 起始时间 (以 time_base 为单位, `NOPTS_VALUE` 表示未知)
    pub start_time: i64,
    /// 流时长 (以 time_base 为单位, `NOPTS_VALUE` 表示未知)
    pub duration: i64,
    /// 流特定参数
    pub params: StreamParams,
}

/// 流特定参数
#[derive(Debug, Clone)]
pub enum StreamParams {
    /// 视频流参数
    Video(VideoStreamParams),
    /// 音频流参数
    Audio(AudioStreamParams),
}

/// 视频流参数
#[derive(Debug, Clone)]
pub struct VideoStreamParams {
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 像素格式
    pub pixel_format: PixelFormat,
    /// 帧率
    pub frame_rate: Rational,
    /// 采样宽高比, 分子为 0 表示未指定
    pub sample_aspect_ratio: Rational,
}

/// 音频流参数
#[derive(Debug, Clone)]
pub struct AudioStreamParams {
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道布局
    pub channel_layout: ChannelLayout,
    /// 采样格式
    pub sample_format: SampleFormat,
}

impl Stream {
    /// 创建视频流描述, 起始时间与时长未知
    pub fn video(index: usize, time_base: Rational, params: VideoStreamParams) -> Self {
        Self {
            index,
            media_type: MediaType::Video,
            codec_id: CodecId::None,
            time_base,
            start_time: NOPTS_VALUE,
            duration: NOPTS_VALUE,
            params: StreamParams::Video(params),
        }
    }

    /// 创建音频流描述, 起始时间与时长未知
    pub fn audio(index: usize, time_base: Rational, params: AudioStreamParams) -> Self {
        Self {
            index,
            media_type: MediaType::Audio,
            codec_id: CodecId::None,
            time_base,
            start_time: NOPTS_VALUE,
            duration: NOPTS_VALUE,
            params: StreamParams::Audio(params),
        }
    }

    /// 获取视频参数 (如果是视频流)
    pub fn video_params(&self) -> Option<&VideoStreamParams> {
        match &self.params {
            StreamParams::Video(v) => Some(v),
            StreamParams::Audio(_) => None,
        }
    }

    /// 获取音频参数 (如果是音频流)
    pub fn audio_params(&self) -> Option<&AudioStreamParams> {
        match &self.params {
            StreamParams::Audio(a) => Some(a),
            StreamParams::Video(_) => None,
        }
    }
}
