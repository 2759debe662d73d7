//! # avio-codec
//!
//! 解码单元 (视频帧 / 音频采样块) 的类型定义, 以及读写层依赖的上游编解码器接口.
//!
//! 真正的编解码实现 (打开文件、压缩、容器解析) 不在本 crate 中:
//! 它们通过实现 [`MediaDecoder`] / [`MediaEncoder`] 接入读写会话.

pub mod codec_id;
pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod stream;

// 重导出常用类型
pub use codec_id::CodecId;
pub use decoder::MediaDecoder;
pub use encoder::MediaEncoder;
pub use frame::{AudioFrame, Frame, VideoFrame};
pub use stream::{AudioStreamParams, Stream, StreamParams, VideoStreamParams};
