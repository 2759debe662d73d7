//! # avio-format
//!
//! avio 的读写会话层.
//!
//! - 读: [`AvInput`] 把上游解码器交错产出的视频帧和音频块分流到两个 FIFO 队列
//!   ([`DemuxQueues`]), 按流读取并跟踪各自的显示时间.
//! - 写: [`AvOutput`] 转换视频帧的像素格式, 并用 [`AudioRebuffer`] 把任意长度的
//!   音频块切成编码器要求的定长帧.

pub mod config;
pub mod demux;
pub mod input;
pub mod output;
pub mod rebuffer;

pub use config::{AudioOutputConfig, FrameRate, OutputConfig, guess_codecs};
pub use demux::{DemuxQueues, Timed};
pub use input::{AvInput, InputUnit};
pub use output::AvOutput;
pub use rebuffer::AudioRebuffer;
