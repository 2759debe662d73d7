//! 像素格式转换模块.
//!
//! 支持的转换路径:
//! - RGB24 / BGR24 / RGBA → YUV420P (BT.601)
//! - Gray8 → YUV420P
//! - NV12 → YUV420P
//! - YUV420P → RGB24 (BT.601)
//!
//! 使用 BT.601 标准色彩矩阵:
//! ```text
//! Y  =  0.299 * R + 0.587 * G + 0.114 * B
//! Cb = -0.169 * R - 0.331 * G + 0.500 * B + 128
//! Cr =  0.500 * R - 0.419 * G - 0.081 * B + 128
//! ```
//!
//! 奇数尺寸的色度平面向上取整, 边缘块只对存在的像素取平均.

use avio_codec::VideoFrame;
use avio_core::{AvError, AvResult, PixelFormat};

/// 检查给定的格式转换是否支持
pub fn is_conversion_supported(src: PixelFormat, dst: PixelFormat) -> bool {
    src == dst
        || matches!(
            (src, dst),
            (PixelFormat::Rgb24, PixelFormat::Yuv420p)
                | (PixelFormat::Bgr24, PixelFormat::Yuv420p)
                | (PixelFormat::Rgba, PixelFormat::Yuv420p)
                | (PixelFormat::Gray8, PixelFormat::Yuv420p)
                | (PixelFormat::Nv12, PixelFormat::Yuv420p)
                | (PixelFormat::Yuv420p, PixelFormat::Rgb24)
        )
}

/// 将整帧转换为目标像素格式
///
/// 源格式与目标格式相同时返回一份拷贝. 时间戳与宽高比原样保留.
pub fn convert_frame(src: &VideoFrame, dst_format: PixelFormat) -> AvResult<VideoFrame> {
    check_planes(src)?;
    if src.pixel_format == dst_format {
        return Ok(src.clone());
    }

    let mut dst = VideoFrame::alloc(src.width, src.height, dst_format)?;
    dst.pts = src.pts;
    dst.time_base = src.time_base;
    dst.sample_aspect_ratio = src.sample_aspect_ratio;

    match (src.pixel_format, dst_format) {
        (PixelFormat::Rgb24, PixelFormat::Yuv420p) => packed_to_yuv420p(src, &mut dst, RGB24),
        (PixelFormat::Bgr24, PixelFormat::Yuv420p) => packed_to_yuv420p(src, &mut dst, BGR24),
        (PixelFormat::Rgba, PixelFormat::Yuv420p) => packed_to_yuv420p(src, &mut dst, RGBA),
        (PixelFormat::Gray8, PixelFormat::Yuv420p) => gray8_to_yuv420p(src, &mut dst),
        (PixelFormat::Nv12, PixelFormat::Yuv420p) => nv12_to_yuv420p(src, &mut dst),
        (PixelFormat::Yuv420p, PixelFormat::Rgb24) => yuv420p_to_rgb24(src, &mut dst),
        _ => {
            return Err(AvError::Unsupported(format!(
                "不支持的格式转换: {} → {}",
                src.pixel_format, dst_format,
            )));
        }
    }

    Ok(dst)
}

/// 校验源帧各平面的行宽与数据长度
fn check_planes(frame: &VideoFrame) -> AvResult<()> {
    let format = frame.pixel_format;
    let plane_count = format.plane_count() as usize;
    if frame.data.len() < plane_count || frame.linesize.len() < plane_count {
        return Err(AvError::InvalidArgument(format!(
            "{format} 帧需要 {plane_count} 个平面, 实际 {}",
            frame.data.len()
        )));
    }
    for plane in 0..plane_count {
        let min_linesize = format.plane_linesize(plane, frame.width).unwrap_or(0);
        let rows = format.plane_height(plane, frame.height).unwrap_or(0);
        let linesize = frame.linesize[plane];
        if linesize < min_linesize || frame.data[plane].len() < linesize * rows {
            return Err(AvError::InvalidArgument(format!(
                "{format} 帧平面 {plane} 数据不足: linesize={linesize}, 长度={}",
                frame.data[plane].len()
            )));
        }
    }
    Ok(())
}

// ============================================================
// BT.601 颜色空间转换常量 (定点数, 缩放 256 倍)
// ============================================================

const Y_R: i32 = 77; // 0.299 * 256
const Y_G: i32 = 150; // 0.587 * 256
const Y_B: i32 = 29; // 0.114 * 256

const CB_R: i32 = -43; // -0.169 * 256
const CB_G: i32 = -85; // -0.331 * 256
const CB_B: i32 = 128; // 0.500 * 256

const CR_R: i32 = 128; // 0.500 * 256
const CR_G: i32 = -107; // -0.419 * 256
const CR_B: i32 = -21; // -0.081 * 256

/// 打包 RGB 类格式中各分量的字节偏移
#[derive(Clone, Copy)]
struct PackedLayout {
    bytes_per_pixel: usize,
    r: usize,
    g: usize,
    b: usize,
}

const RGB24: PackedLayout = PackedLayout {
    bytes_per_pixel: 3,
    r: 0,
    g: 1,
    b: 2,
};

const BGR24: PackedLayout = PackedLayout {
    bytes_per_pixel: 3,
    r: 2,
    g: 1,
    b: 0,
};

const RGBA: PackedLayout = PackedLayout {
    bytes_per_pixel: 4,
    r: 0,
    g: 1,
    b: 2,
};

fn luma(r: i32, g: i32, b: i32) -> u8 {
    ((Y_R * r + Y_G * g + Y_B * b + 128) >> 8).clamp(0, 255) as u8
}

/// 打包 RGB → YUV420P (2x2 块色度平均)
fn packed_to_yuv420p(src: &VideoFrame, dst: &mut VideoFrame, layout: PackedLayout) {
    let w = src.width as usize;
    let h = src.height as usize;
    let stride = src.linesize[0];
    let rgb = &src.data[0];
    let bpp = layout.bytes_per_pixel;

    let pixel = |row: usize, col: usize| {
        let off = row * stride + col * bpp;
        (
            i32::from(rgb[off + layout.r]),
            i32::from(rgb[off + layout.g]),
            i32::from(rgb[off + layout.b]),
        )
    };

    let y_stride = dst.linesize[0];
    for row in 0..h {
        for col in 0..w {
            let (r, g, b) = pixel(row, col);
            dst.data[0][row * y_stride + col] = luma(r, g, b);
        }
    }

    let u_stride = dst.linesize[1];
    let v_stride = dst.linesize[2];
    for cy in 0..h.div_ceil(2) {
        for cx in 0..w.div_ceil(2) {
            let (mut sum_r, mut sum_g, mut sum_b, mut count) = (0i32, 0i32, 0i32, 0i32);
            for row in (cy * 2)..(cy * 2 + 2).min(h) {
                for col in (cx * 2)..(cx * 2 + 2).min(w) {
                    let (r, g, b) = pixel(row, col);
                    sum_r += r;
                    sum_g += g;
                    sum_b += b;
                    count += 1;
                }
            }
            let (r, g, b) = (sum_r / count, sum_g / count, sum_b / count);
            let cb = ((CB_R * r + CB_G * g + CB_B * b + 128) >> 8) + 128;
            let cr = ((CR_R * r + CR_G * g + CR_B * b + 128) >> 8) + 128;
            dst.data[1][cy * u_stride + cx] = cb.clamp(0, 255) as u8;
            dst.data[2][cy * v_stride + cx] = cr.clamp(0, 255) as u8;
        }
    }
}

/// Gray8 → YUV420P (亮度直接复制, 色度取中性值)
fn gray8_to_yuv420p(src: &VideoFrame, dst: &mut VideoFrame) {
    let w = src.width as usize;
    copy_rows(&src.data[0], src.linesize[0], &mut dst.data[0], dst.linesize[0], w, src.height as usize);
    dst.data[1].fill(128);
    dst.data[2].fill(128);
}

/// NV12 → YUV420P (UV 交错拆分为独立 U/V 平面)
fn nv12_to_yuv420p(src: &VideoFrame, dst: &mut VideoFrame) {
    let w = src.width as usize;
    let h = src.height as usize;
    copy_rows(&src.data[0], src.linesize[0], &mut dst.data[0], dst.linesize[0], w, h);

    let uv = &src.data[1];
    let uv_stride = src.linesize[1];
    let u_stride = dst.linesize[1];
    let v_stride = dst.linesize[2];
    for row in 0..h.div_ceil(2) {
        for col in 0..w.div_ceil(2) {
            let off = row * uv_stride + col * 2;
            dst.data[1][row * u_stride + col] = uv[off];
            dst.data[2][row * v_stride + col] = uv[off + 1];
        }
    }
}

/// YUV420P → RGB24 (BT.601)
fn yuv420p_to_rgb24(src: &VideoFrame, dst: &mut VideoFrame) {
    let w = src.width as usize;
    let h = src.height as usize;
    let (y_stride, u_stride, v_stride) = (src.linesize[0], src.linesize[1], src.linesize[2]);
    let dst_stride = dst.linesize[0];
    let rgb = &mut dst.data[0];

    for row in 0..h {
        for col in 0..w {
            let y = i32::from(src.data[0][row * y_stride + col]);
            let u = i32::from(src.data[1][(row / 2) * u_stride + col / 2]) - 128;
            let v = i32::from(src.data[2][(row / 2) * v_stride + col / 2]) - 128;

            let r = (y + ((v * 359 + 128) >> 8)).clamp(0, 255);
            let g = (y - ((u * 88 + v * 183 + 128) >> 8)).clamp(0, 255);
            let b = (y + ((u * 454 + 128) >> 8)).clamp(0, 255);

            let off = row * dst_stride + col * 3;
            rgb[off] = r as u8;
            rgb[off + 1] = g as u8;
            rgb[off + 2] = b as u8;
        }
    }
}

fn copy_rows(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
) {
    for row in 0..height {
        let from = &src[row * src_stride..row * src_stride + width];
        dst[row * dst_stride..row * dst_stride + width].copy_from_slice(from);
    }
}
