//! 音频采样格式定义.
//!
//! 本层只处理交错 (Interleaved) 排列的采样块: 所有声道的采样点交替排列, 如 LRLRLR...

use std::fmt;

/// 音频采样格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum SampleFormat {
    /// 未指定
    None,
    /// 无符号 8 位整数
    U8,
    /// 有符号 16 位整数 (默认, 大多数音频编码器的输入格式)
    #[default]
    S16,
    /// 有符号 32 位整数
    S32,
    /// 32 位浮点
    F32,
    /// 64 位浮点
    F64,
}

impl SampleFormat {
    /// 每个采样点占用的字节数
    pub const fn bytes_per_sample(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::U8 => 1,
            Self::S16 => 2,
            Self::S32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// 是否为有符号整数格式
    pub const fn is_signed_integer(&self) -> bool {
        matches!(self, Self::S16 | Self::S32)
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::U8 => "u8",
            Self::S16 => "s16",
            Self::S32 => "s32",
            Self::F32 => "flt",
            Self::F64 => "dbl",
        };
        write!(f, "{name}")
    }
}
