//! 解码单元: 视频帧与音频采样块.
//!
//! 音频采样块对上层只暴露三样东西: 声道数、每声道采样数、以及一块固定字节布局的原始内存
//! (交错排列, 小端). 采样数据放在 [`Bytes`] 中, 切片和克隆都不复制内存.

use avio_core::{
    AvError, AvResult, ChannelLayout, MediaType, NOPTS_VALUE, PixelFormat, Rational, SampleFormat,
};
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;

/// 视频帧
///
/// 包含解码后的原始像素数据, 支持多平面存储.
/// 例如 YUV420P 格式有 3 个平面: Y, U, V.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// 各平面的像素数据
    pub data: Vec<Vec<u8>>,
    /// 各平面每行的字节数 (linesize / stride)
    pub linesize: Vec<usize>,
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 像素格式
    pub pixel_format: PixelFormat,
    /// 显示时间戳 (PTS), `NOPTS_VALUE` 表示未知
    pub pts: i64,
    /// 时间基
    pub time_base: Rational,
    /// 采样宽高比 (SAR)
    pub sample_aspect_ratio: Rational,
}

impl VideoFrame {
    /// 创建空的视频帧 (平面数据为空)
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        let plane_count = pixel_format.plane_count() as usize;
        Self {
            data: vec![Vec::new(); plane_count],
            linesize: vec![0; plane_count],
            width,
            height,
            pixel_format,
            pts: NOPTS_VALUE,
            time_base: Rational::UNDEFINED,
            sample_aspect_ratio: Rational::ONE,
        }
    }

    /// 创建按紧凑行宽分配好的全零视频帧
    pub fn alloc(width: u32, height: u32, pixel_format: PixelFormat) -> AvResult<Self> {
        if pixel_format == PixelFormat::None {
            return Err(AvError::InvalidArgument("无法为 none 像素格式分配帧".into()));
        }
        let mut frame = Self::new(width, height, pixel_format);
        for plane in 0..pixel_format.plane_count() as usize {
            let linesize = pixel_format.plane_linesize(plane, width).unwrap_or(0);
            let rows = pixel_format.plane_height(plane, height).unwrap_or(0);
            frame.linesize[plane] = linesize;
            frame.data[plane] = vec![0u8; linesize * rows];
        }
        Ok(frame)
    }

    /// 由紧凑排列的单块内存构造视频帧, 按像素格式切分平面
    pub fn from_packed(
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        memory: &[u8],
    ) -> AvResult<Self> {
        let expected = pixel_format.frame_size(width, height).ok_or_else(|| {
            AvError::InvalidArgument(format!("无法计算 {pixel_format} 帧大小"))
        })?;
        if memory.len() != expected {
            return Err(AvError::ShapeMismatch {
                expected: format!("{expected} 字节"),
                actual: format!("{} 字节", memory.len()),
            });
        }
        let mut frame = Self::alloc(width, height, pixel_format)?;
        let mut offset = 0;
        for plane in frame.data.iter_mut() {
            let len = plane.len();
            plane.copy_from_slice(&memory[offset..offset + len]);
            offset += len;
        }
        Ok(frame)
    }

    /// 帧尺寸 (宽, 高)
    pub fn shape(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// 音频采样块
///
/// 交错排列: `data` 中所有声道的采样点交替存放, 长度为
/// `nb_samples * channels * bytes_per_sample`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// 交错排列的原始采样内存 (小端)
    pub data: Bytes,
    /// 每声道采样数
    pub nb_samples: u32,
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 采样格式
    pub sample_format: SampleFormat,
    /// 声道布局
    pub channel_layout: ChannelLayout,
    /// 显示时间戳 (PTS), `NOPTS_VALUE` 表示未知
    pub pts: i64,
    /// 时间基
    pub time_base: Rational,
}

impl AudioFrame {
    /// 由原始交错内存构造采样块, 每声道采样数由内存长度推出
    ///
    /// 内存长度必须是 `channels * bytes_per_sample` 的整数倍.
    pub fn from_bytes(
        data: impl Into<Bytes>,
        channels: u32,
        sample_format: SampleFormat,
        sample_rate: u32,
    ) -> AvResult<Self> {
        let data = data.into();
        let stride = channels as usize * sample_format.bytes_per_sample() as usize;
        if stride == 0 {
            return Err(AvError::InvalidArgument(format!(
                "无效的采样块参数: {channels} 声道, {sample_format}"
            )));
        }
        if data.len() % stride != 0 {
            return Err(AvError::ShapeMismatch {
                expected: format!("{stride} 字节的整数倍"),
                actual: format!("{} 字节", data.len()),
            });
        }
        Ok(Self {
            nb_samples: (data.len() / stride) as u32,
            data,
            sample_rate,
            sample_format,
            channel_layout: ChannelLayout::from_channels(channels),
            pts: NOPTS_VALUE,
            time_base: Rational::UNDEFINED,
        })
    }

    /// 由交错排列的 16 位有符号采样构造采样块
    pub fn from_i16(samples: &[i16], channels: u32, sample_rate: u32) -> AvResult<Self> {
        let mut buf = vec![0u8; samples.len() * 2];
        LittleEndian::write_i16_into(samples, &mut buf);
        Self::from_bytes(buf, channels, SampleFormat::S16, sample_rate)
    }

    /// 以 16 位有符号整数读出全部交错采样
    pub fn to_i16(&self) -> AvResult<Vec<i16>> {
        if self.sample_format != SampleFormat::S16 {
            return Err(AvError::TypeMismatch {
                expected: SampleFormat::S16.to_string(),
                actual: self.sample_format.to_string(),
            });
        }
        let mut samples = vec![0i16; self.data.len() / 2];
        LittleEndian::read_i16_into(&self.data, &mut samples);
        Ok(samples)
    }

    /// 声道数
    pub fn channels(&self) -> u32 {
        self.channel_layout.channels
    }

    /// 一个采样点 (全部声道) 占用的字节数
    pub fn stride(&self) -> usize {
        self.channels() as usize * self.sample_format.bytes_per_sample() as usize
    }

    /// 形状 (声道数, 每声道采样数)
    pub fn shape(&self) -> (u32, u32) {
        (self.channels(), self.nb_samples)
    }

    /// 原始内存视图
    pub fn memory(&self) -> &[u8] {
        &self.data
    }
}

/// 解码单元 (视频帧或音频采样块)
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// 视频帧
    Video(VideoFrame),
    /// 音频采样块
    Audio(AudioFrame),
}

impl Frame {
    /// 所属媒体类型
    pub fn media_type(&self) -> MediaType {
        match self {
            Self::Video(_) => MediaType::Video,
            Self::Audio(_) => MediaType::Audio,
        }
    }

    /// 原始显示时间戳
    pub fn pts(&self) -> i64 {
        match self {
            Self::Video(v) => v.pts,
            Self::Audio(a) => a.pts,
        }
    }
}
