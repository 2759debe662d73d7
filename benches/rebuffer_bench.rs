//! avio 性能基准测试.
//!
//! 覆盖音频重分块与写会话的像素格式转换两条热路径.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use avio::codec::{AudioFrame, VideoFrame};
use avio::core::{PixelFormat, SampleFormat};
use avio::format::AudioRebuffer;
use avio::scale::convert_frame;

/// 创建 S16 立体声音频块
fn make_s16_block(nb_samples: usize, sample_rate: u32) -> AudioFrame {
    let samples: Vec<i16> = (0..nb_samples * 2)
        .map(|i| ((i % 256) as i16).wrapping_mul(100))
        .collect();
    AudioFrame::from_i16(&samples, 2, sample_rate).unwrap()
}

/// 创建渐变 RGB24 视频帧
fn make_rgb_frame(width: u32, height: u32) -> VideoFrame {
    let mut data = vec![0u8; (width * height * 3) as usize];
    for (i, px) in data.chunks_exact_mut(3).enumerate() {
        px[0] = (i % 256) as u8;
        px[1] = ((i / 7) % 256) as u8;
        px[2] = ((i / 13) % 256) as u8;
    }
    VideoFrame::from_packed(width, height, PixelFormat::Rgb24, &data).unwrap()
}

fn bench_rebuffer_aligned(c: &mut Criterion) {
    c.bench_function("rebuffer_1152_from_4608_s16_stereo", |b| {
        let block = make_s16_block(4608, 44100);
        let mut rb = AudioRebuffer::new(1152, 2, SampleFormat::S16, 44100).unwrap();
        b.iter(|| {
            let frames = rb.push(black_box(&block)).unwrap();
            black_box(frames);
        });
    });
}

fn bench_rebuffer_unaligned(c: &mut Criterion) {
    c.bench_function("rebuffer_1024_from_441_s16_stereo", |b| {
        // 10ms 一块, 与 AAC 帧大小不对齐, 每次都要经过进位缓冲区
        let block = make_s16_block(441, 44100);
        let mut rb = AudioRebuffer::new(1024, 2, SampleFormat::S16, 44100).unwrap();
        b.iter(|| {
            let frames = rb.push(black_box(&block)).unwrap();
            black_box(frames);
        });
    });
}

fn bench_rgb_to_yuv(c: &mut Criterion) {
    c.bench_function("rgb24_to_yuv420p_1280x720", |b| {
        let frame = make_rgb_frame(1280, 720);
        b.iter(|| {
            let out = convert_frame(black_box(&frame), PixelFormat::Yuv420p).unwrap();
            black_box(out);
        });
    });
}

criterion_group!(
    benches,
    bench_rebuffer_aligned,
    bench_rebuffer_unaligned,
    bench_rgb_to_yuv,
);
criterion_main!(benches);
