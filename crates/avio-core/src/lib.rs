//! # avio-core
//!
//! avio 音视频读写层的核心库, 提供基础类型定义、错误处理和时间戳归一化.
//!
//! 上层的读写会话 (`avio-format`) 与上游编解码器接口 (`avio-codec`) 都只依赖本 crate
//! 中的类型, 不关心具体的编解码实现.

pub mod channel_layout;
pub mod error;
pub mod media_type;
pub mod pixel_format;
pub mod rational;
pub mod sample_format;
pub mod timestamp;

// 重导出常用类型
pub use channel_layout::ChannelLayout;
pub use error::{AvError, AvResult};
pub use media_type::MediaType;
pub use pixel_format::PixelFormat;
pub use rational::Rational;
pub use sample_format::SampleFormat;
pub use timestamp::{NOPTS_VALUE, Timestamp, normalize};
