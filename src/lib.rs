//! # avio
//!
//! 音视频读写层: 位于应用程序与上游编解码器之间, 负责把解码器交错产出的视频帧/音频块
//! 分流成两条按时间有序的读取通道, 并把调用方任意长度的音频块重新切成编码器要求的定长帧.
//!
//! 真正的解码和编码由调用方实现 [`codec::MediaDecoder`] / [`codec::MediaEncoder`] 接入.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use avio::format::{AudioOutputConfig, OutputConfig};
//!
//! // 640x480, 29.97fps, 附带 44.1kHz 立体声音频
//! let config = OutputConfig::new("out.avi", 2_000_000, 640, 480, 29.97)
//!     .with_audio(AudioOutputConfig::default());
//! println!("视频时间基: {}", config.time_base());
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `avio-core` | 核心类型、时间戳归一化、错误类型 |
//! | `avio-codec` | 解码单元与上游编解码器接口 |
//! | `avio-scale` | 像素格式转换 |
//! | `avio-format` | 读会话、写会话、音频重分块 |

pub mod logging;

/// 核心类型与工具
pub use avio_core as core;

/// 解码单元与上游编解码器接口
pub use avio_codec as codec;

/// 像素格式转换
pub use avio_scale as scale;

/// 读写会话
pub use avio_format as format;

/// 获取 avio 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
