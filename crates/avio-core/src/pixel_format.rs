//! 像素格式定义.
//!
//! 只收录读写层实际会遇到的格式: 编码器的 YUV420P 输入,
//! 以及调用方常见的 RGB/灰度/NV12 帧.

use std::fmt;

/// 像素格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum PixelFormat {
    /// 未指定
    None,
    /// YUV 4:2:0 平面格式, 8 位 (编码器默认输入)
    #[default]
    Yuv420p,
    /// NV12: Y 平面 + UV 交错, 4:2:0, 8 位
    Nv12,
    /// RGB 各 8 位, 打包
    Rgb24,
    /// BGR 各 8 位, 打包
    Bgr24,
    /// RGBA 各 8 位, 打包
    Rgba,
    /// 灰度 8 位
    Gray8,
}

impl PixelFormat {
    /// 获取色度子采样 (log2 水平, log2 垂直)
    pub const fn chroma_subsampling(&self) -> (u32, u32) {
        match self {
            Self::Yuv420p | Self::Nv12 => (1, 1),
            _ => (0, 0),
        }
    }

    /// 平面数量
    pub const fn plane_count(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Yuv420p => 3,
            Self::Nv12 => 2,
            Self::Rgb24 | Self::Bgr24 | Self::Rgba | Self::Gray8 => 1,
        }
    }

    /// 计算指定平面每行的字节数 (linesize / stride)
    ///
    /// 格式为 None 或平面索引超出范围时返回 `None`.
    pub fn plane_linesize(&self, plane: usize, width: u32) -> Option<usize> {
        if plane >= self.plane_count() as usize {
            return None;
        }
        let w = width as usize;
        Some(match self {
            Self::Yuv420p => {
                if plane == 0 {
                    w
                } else {
                    w.div_ceil(2)
                }
            }
            // plane1 为 UV 交错, 每行 (w/2)*2 字节
            Self::Nv12 => {
                if plane == 0 {
                    w
                } else {
                    w.div_ceil(2) * 2
                }
            }
            Self::Rgb24 | Self::Bgr24 => w * 3,
            Self::Rgba => w * 4,
            Self::Gray8 => w,
            Self::None => return None,
        })
    }

    /// 计算指定平面的行数
    pub fn plane_height(&self, plane: usize, height: u32) -> Option<usize> {
        if plane >= self.plane_count() as usize {
            return None;
        }
        let h = height as usize;
        let (_, sub_v) = self.chroma_subsampling();
        Some(if plane == 0 || sub_v == 0 {
            h
        } else {
            h.div_ceil(2)
        })
    }

    /// 计算整帧的字节数
    pub fn frame_size(&self, width: u32, height: u32) -> Option<usize> {
        if *self == Self::None {
            return None;
        }
        let mut total = 0usize;
        for plane in 0..self.plane_count() as usize {
            total += self.plane_linesize(plane, width)? * self.plane_height(plane, height)?;
        }
        Some(total)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Yuv420p => "yuv420p",
            Self::Nv12 => "nv12",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
            Self::Rgba => "rgba",
            Self::Gray8 => "gray8",
        };
        write!(f, "{name}")
    }
}
