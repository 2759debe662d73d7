//! 写会话配置.

use std::path::Path;

use avio_codec::CodecId;
use avio_core::rational::FRAME_RATE_DENOMINATOR;
use avio_core::{AvError, AvResult, Rational};

/// 帧率
///
/// 浮点帧率在使用时以 90000 为分母近似成分数.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameRate {
    /// 精确分数
    Exact(Rational),
    /// 浮点近似值
    Approx(f64),
}

impl FrameRate {
    /// 转换为分数
    pub fn to_rational(self) -> Rational {
        match self {
            Self::Exact(r) => r,
            Self::Approx(v) => Rational::approximate(v, FRAME_RATE_DENOMINATOR),
        }
    }
}

impl From<Rational> for FrameRate {
    fn from(r: Rational) -> Self {
        Self::Exact(r)
    }
}

impl From<(i32, i32)> for FrameRate {
    fn from((num, den): (i32, i32)) -> Self {
        Self::Exact(Rational::new(num, den))
    }
}

impl From<i32> for FrameRate {
    fn from(fps: i32) -> Self {
        Self::Exact(Rational::new(fps, 1))
    }
}

impl From<f64> for FrameRate {
    fn from(fps: f64) -> Self {
        Self::Approx(fps)
    }
}

/// 音频输出配置
#[derive(Debug, Clone, PartialEq)]
pub struct AudioOutputConfig {
    /// 码率 (bit/s)
    pub bit_rate: u64,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道数
    pub channels: u32,
    /// 编码器, `None` 时按输出扩展名推断
    pub codec: Option<CodecId>,
}

impl Default for AudioOutputConfig {
    fn default() -> Self {
        Self {
            bit_rate: 64_000,
            sample_rate: 44_100,
            channels: 2,
            codec: None,
        }
    }
}

impl AudioOutputConfig {
    /// 创建音频配置
    pub fn new(bit_rate: u64, sample_rate: u32, channels: u32) -> Self {
        Self {
            bit_rate,
            sample_rate,
            channels,
            codec: None,
        }
    }

    /// 指定音频编码器
    pub fn with_codec(mut self, codec: CodecId) -> Self {
        self.codec = Some(codec);
        self
    }
}

/// 写会话配置
///
/// 构造后通过 `with_*` 方法补充可选项, 例如:
///
/// ```
/// use avio_format::{AudioOutputConfig, OutputConfig};
///
/// let config = OutputConfig::new("out.avi", 2_000_000, 640, 480, 29.97)
///     .with_audio(AudioOutputConfig::default());
/// assert!(config.audio_enabled());
/// assert_eq!(config.frame_rate.num, 2997);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// 输出目标 (MRL)
    pub destination: String,
    /// 视频码率 (bit/s)
    pub video_bit_rate: u64,
    /// 宽度
    pub width: u32,
    /// 高度
    pub height: u32,
    /// 帧率
    pub frame_rate: Rational,
    /// 宽高比
    pub aspect_ratio: Rational,
    /// 视频编码器, `None` 时按输出扩展名推断
    pub video_codec: Option<CodecId>,
    /// 音频配置, `None` 表示不写音频
    pub audio: Option<AudioOutputConfig>,
}

impl OutputConfig {
    /// 创建只含视频的配置
    pub fn new(
        destination: impl Into<String>,
        video_bit_rate: u64,
        width: u32,
        height: u32,
        frame_rate: impl Into<FrameRate>,
    ) -> Self {
        Self {
            destination: destination.into(),
            video_bit_rate,
            width,
            height,
            frame_rate: frame_rate.into().to_rational(),
            aspect_ratio: Rational::ONE,
            video_codec: None,
            audio: None,
        }
    }

    /// 指定宽高比
    pub fn with_aspect_ratio(mut self, aspect_ratio: Rational) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// 指定视频编码器
    pub fn with_video_codec(mut self, codec: CodecId) -> Self {
        self.video_codec = Some(codec);
        self
    }

    /// 启用音频
    pub fn with_audio(mut self, audio: AudioOutputConfig) -> Self {
        self.audio = Some(audio);
        self
    }

    /// 是否写音频
    pub fn audio_enabled(&self) -> bool {
        self.audio.is_some()
    }

    /// 视频时间基 (帧率的倒数)
    pub fn time_base(&self) -> Rational {
        self.frame_rate.invert().reduce()
    }

    /// 实际使用的视频编码器
    pub fn resolved_video_codec(&self) -> CodecId {
        self.video_codec
            .unwrap_or_else(|| guess_codecs(&self.destination).0)
    }

    /// 实际使用的音频编码器, 未启用音频时为 `None`
    pub fn resolved_audio_codec(&self) -> Option<CodecId> {
        let audio = self.audio.as_ref()?;
        Some(
            audio
                .codec
                .unwrap_or_else(|| guess_codecs(&self.destination).1),
        )
    }

    /// 检查配置
    pub fn validate(&self) -> AvResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AvError::InvalidArgument(format!(
                "无效的分辨率: {}x{}",
                self.width, self.height
            )));
        }
        let fr = self.frame_rate;
        if fr.num <= 0 || fr.den <= 0 {
            return Err(AvError::InvalidArgument(format!("无效的帧率: {fr}")));
        }
        if self.aspect_ratio.num < 0 || self.aspect_ratio.den <= 0 {
            return Err(AvError::InvalidArgument(format!(
                "无效的宽高比: {}",
                self.aspect_ratio
            )));
        }
        if let Some(audio) = &self.audio {
            if audio.channels == 0 {
                return Err(AvError::InvalidArgument("声道数不能为 0".into()));
            }
            if audio.sample_rate == 0 || audio.sample_rate > i32::MAX as u32 {
                return Err(AvError::InvalidArgument(format!(
                    "无效的采样率: {}",
                    audio.sample_rate
                )));
            }
        }
        Ok(())
    }
}

/// 按输出扩展名推断 (视频, 音频) 编码器
///
/// 无法识别的扩展名使用 MPEG 节目流的默认组合.
pub fn guess_codecs(destination: &str) -> (CodecId, CodecId) {
    let ext = Path::new(destination)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("mp4" | "m4v" | "mov") => (CodecId::Mpeg4, CodecId::Aac),
        Some("avi") => (CodecId::Mpeg4, CodecId::Mp3),
        Some("ogg" | "ogv") => (CodecId::Theora, CodecId::Vorbis),
        Some("mkv") => (CodecId::H264, CodecId::Aac),
        Some("mjpeg" | "mjpg") => (CodecId::Mjpeg, CodecId::PcmS16le),
        _ => (CodecId::Mpeg1Video, CodecId::Mp2),
    }
}
