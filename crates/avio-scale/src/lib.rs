//! # avio-scale
//!
//! 视频帧像素格式转换.
//!
//! 写会话在把帧交给编码器之前, 用 [`FrameConverter`] 把调用方的帧转换成
//! 编码器要求的像素格式. 只做格式转换, 不做缩放: 分辨率必须与输出一致.

pub mod convert;

use std::borrow::Cow;

use avio_codec::VideoFrame;
use avio_core::{AvError, AvResult, PixelFormat};
use log::trace;

pub use convert::{convert_frame, is_conversion_supported};

/// 帧转换上下文
///
/// 配置一次后对每一帧复用, 目标分辨率和像素格式固定.
#[derive(Debug, Clone)]
pub struct FrameConverter {
    /// 目标宽度
    pub width: u32,
    /// 目标高度
    pub height: u32,
    /// 目标像素格式
    pub dst_format: PixelFormat,
}

impl FrameConverter {
    /// 创建新的转换上下文
    pub fn new(width: u32, height: u32, dst_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            dst_format,
        }
    }

    /// 将一帧转换为目标格式
    ///
    /// 像素格式已经一致时直接借用原帧, 不复制像素数据.
    ///
    /// # 错误
    /// - `ShapeMismatch`: 帧分辨率与目标分辨率不同
    /// - `Unsupported`: 不支持的格式转换
    pub fn convert<'a>(&self, frame: &'a VideoFrame) -> AvResult<Cow<'a, VideoFrame>> {
        if frame.shape() != (self.width, self.height) {
            return Err(AvError::ShapeMismatch {
                expected: format!("{}x{}", self.width, self.height),
                actual: format!("{}x{}", frame.width, frame.height),
            });
        }
        if frame.pixel_format == self.dst_format {
            return Ok(Cow::Borrowed(frame));
        }
        trace!("像素格式转换: {} → {}", frame.pixel_format, self.dst_format);
        convert_frame(frame, self.dst_format).map(Cow::Owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_格式一致时借用原帧() {
        let frame = VideoFrame::alloc(4, 2, PixelFormat::Yuv420p).unwrap();
        let converter = FrameConverter::new(4, 2, PixelFormat::Yuv420p);
        let out = converter.convert(&frame).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_转换为目标格式() {
        let frame = VideoFrame::alloc(4, 2, PixelFormat::Rgb24).unwrap();
        let converter = FrameConverter::new(4, 2, PixelFormat::Yuv420p);
        let out = converter.convert(&frame).unwrap();
        assert_eq!(out.pixel_format, PixelFormat::Yuv420p);
        assert_eq!(out.data.len(), 3);
    }

    #[test]
    fn test_分辨率不符() {
        let frame = VideoFrame::alloc(8, 8, PixelFormat::Yuv420p).unwrap();
        let converter = FrameConverter::new(4, 2, PixelFormat::Yuv420p);
        assert!(matches!(
            converter.convert(&frame),
            Err(AvError::ShapeMismatch { .. })
        ));
    }
}
