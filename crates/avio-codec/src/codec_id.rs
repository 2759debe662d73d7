//! 编解码器标识符.

use avio_core::MediaType;
use std::fmt;

/// 编解码器标识符
///
/// 写会话用它告诉上游编码器选用哪种压缩算法; 读会话只用于展示.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// 未知编解码器
    None,

    // ========================
    // 视频编解码器
    // ========================
    /// H.264 / AVC
    H264,
    /// MPEG-1 Video
    Mpeg1Video,
    /// MPEG-2 Video
    Mpeg2Video,
    /// MPEG-4 Part 2
    Mpeg4,
    /// Theora
    Theora,
    /// Motion JPEG
    Mjpeg,
    /// Raw 视频 (未压缩)
    RawVideo,

    // ========================
    // 音频编解码器
    // ========================
    /// AAC
    Aac,
    /// MP3
    Mp3,
    /// MP2
    Mp2,
    /// Vorbis
    Vorbis,
    /// FLAC
    Flac,
    /// PCM 有符号 16 位小端
    PcmS16le,
}

impl CodecId {
    /// 获取编解码器对应的媒体类型
    pub const fn media_type(&self) -> MediaType {
        match self {
            Self::None => MediaType::Data,
            Self::H264
            | Self::Mpeg1Video
            | Self::Mpeg2Video
            | Self::Mpeg4
            | Self::Theora
            | Self::Mjpeg
            | Self::RawVideo => MediaType::Video,
            Self::Aac | Self::Mp3 | Self::Mp2 | Self::Vorbis | Self::Flac | Self::PcmS16le => {
                MediaType::Audio
            }
        }
    }

    /// 获取编解码器的名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::H264 => "h264",
            Self::Mpeg1Video => "mpeg1video",
            Self::Mpeg2Video => "mpeg2video",
            Self::Mpeg4 => "mpeg4",
            Self::Theora => "theora",
            Self::Mjpeg => "mjpeg",
            Self::RawVideo => "rawvideo",
            Self::Aac => "aac",
            Self::Mp3 => "mp3",
            Self::Mp2 => "mp2",
            Self::Vorbis => "vorbis",
            Self::Flac => "flac",
            Self::PcmS16le => "pcm_s16le",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
