//! 端到端集成测试: 读会话.
//!
//! 测试流程: 生成交错的视频帧/音频块脚本 → 脚本解码器 → AvInput → 按流读取 → 验证

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use avio::codec::{
    AudioFrame, AudioStreamParams, Frame, MediaDecoder, Stream, VideoFrame, VideoStreamParams,
};
use avio::core::{AvError, AvResult, ChannelLayout, NOPTS_VALUE, PixelFormat, Rational, SampleFormat};
use avio::format::AvInput;

const SAMPLE_RATE: u32 = 8000;
const BLOCK_SAMPLES: usize = 320;

fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 解码器调用记录, 在会话释放解码器后仍可查看
#[derive(Default)]
struct DecoderLog {
    seeks: Vec<i64>,
    released: usize,
}

/// 按脚本产出单元的解码器, 模拟 25fps 视频 + 8kHz 立体声音频的文件
struct ScriptedDecoder {
    video: Option<Stream>,
    audio: Option<Stream>,
    units: VecDeque<AvResult<Frame>>,
    log: Arc<Mutex<DecoderLog>>,
}

impl ScriptedDecoder {
    fn new(with_video: bool, with_audio: bool, units: Vec<AvResult<Frame>>) -> (Self, Arc<Mutex<DecoderLog>>) {
        let log = Arc::new(Mutex::new(DecoderLog::default()));
        let video = with_video.then(|| {
            let mut stream = Stream::video(
                0,
                Rational::new(1, 90000),
                VideoStreamParams {
                    width: 8,
                    height: 6,
                    pixel_format: PixelFormat::Yuv420p,
                    frame_rate: Rational::new(25, 1),
                    sample_aspect_ratio: Rational::new(0, 1),
                },
            );
            stream.start_time = 0;
            stream
        });
        let audio = with_audio.then(|| {
            Stream::audio(
                1,
                Rational::new(1, SAMPLE_RATE as i32),
                AudioStreamParams {
                    sample_rate: SAMPLE_RATE,
                    channel_layout: ChannelLayout::STEREO,
                    sample_format: SampleFormat::S16,
                },
            )
        });
        let decoder = Self {
            video,
            audio,
            units: units.into(),
            log: Arc::clone(&log),
        };
        (decoder, log)
    }
}

impl Drop for ScriptedDecoder {
    fn drop(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.released += 1;
        }
    }
}

impl MediaDecoder for ScriptedDecoder {
    fn name(&self) -> &str {
        "scripted.mpg"
    }

    fn video_stream(&self) -> Option<&Stream> {
        self.video.as_ref()
    }

    fn audio_stream(&self) -> Option<&Stream> {
        self.audio.as_ref()
    }

    fn duration(&self) -> i64 {
        // 2 秒, 按视频时间基
        180_000
    }

    fn decode_one(&mut self) -> AvResult<Frame> {
        self.units.pop_front().unwrap_or(Err(AvError::Eof))
    }

    fn seek(&mut self, timestamp: i64) -> AvResult<()> {
        self.log.lock().unwrap().seeks.push(timestamp);
        Ok(())
    }
}

/// 第 `index` 帧视频, 亮度平面填充为帧序号
fn video_unit(index: i64) -> AvResult<Frame> {
    let mut frame = VideoFrame::alloc(8, 6, PixelFormat::Yuv420p).unwrap();
    frame.data[0].fill(index as u8);
    frame.pts = index * 3600;
    Ok(Frame::Video(frame))
}

/// 第 `index` 块音频 (立体声, 左右声道取值相反)
fn audio_unit(index: i64) -> AvResult<Frame> {
    let samples: Vec<i16> = (0..BLOCK_SAMPLES)
        .flat_map(|i| {
            let v = (index as i16) * 1000 + i as i16;
            [v, -v]
        })
        .collect();
    let mut block = AudioFrame::from_i16(&samples, 2, SAMPLE_RATE).unwrap();
    block.pts = index * BLOCK_SAMPLES as i64;
    Ok(Frame::Audio(block))
}

/// 1 秒的交错脚本: 每帧视频后跟一块音频
fn interleaved_script(frames: i64) -> Vec<AvResult<Frame>> {
    (0..frames)
        .flat_map(|i| [video_unit(i), audio_unit(i)])
        .collect()
}

#[test]
fn test_交错输入按流读取() {
    init_test_logging();
    let (decoder, _) = ScriptedDecoder::new(true, true, interleaved_script(25));
    let mut input = AvInput::new(Box::new(decoder)).unwrap();

    // 先读完全部视频, 音频块在等待期间被缓存
    let mut video_positions = Vec::new();
    for i in 0..25 {
        let frame = input.read_video().unwrap();
        assert_eq!(frame.data[0][0], i as u8);
        video_positions.push(input.video_pos());
    }
    assert!(input.read_video().unwrap_err().is_eof());
    assert_eq!(video_positions[0], Some(0.0));
    assert_eq!(video_positions[24], Some(0.96));

    // 音频仍按解码顺序完整取出
    for i in 0..25 {
        let block = input.read_audio().unwrap();
        assert_eq!(block.shape(), (2, BLOCK_SAMPLES as u32));
        let samples = block.to_i16().unwrap();
        assert_eq!(samples[0], i as i16 * 1000);
        assert_eq!(samples[1], -(i as i16 * 1000));
        assert_eq!(input.audio_pos(), Some((i * 320) as f64 / 8000.0));
    }
    assert!(input.read_audio().unwrap_err().is_eof());
}

#[test]
fn test_视频与音频交替读取() {
    init_test_logging();
    let (decoder, _) = ScriptedDecoder::new(true, true, interleaved_script(3));
    let mut input = AvInput::new(Box::new(decoder)).unwrap();

    let mut video = Vec::new();
    let mut audio = Vec::new();
    for _ in 0..3 {
        audio.push(input.read_audio().unwrap().pts);
        video.push(input.read_video().unwrap().pts);
    }
    assert_eq!(video, vec![0, 3600, 7200]);
    assert_eq!(audio, vec![0, 320, 640]);
}

#[test]
fn test_输入元数据() {
    let (decoder, _) = ScriptedDecoder::new(true, true, Vec::new());
    let input = AvInput::new(Box::new(decoder)).unwrap();

    assert_eq!(input.name(), "scripted.mpg");
    assert_eq!(input.duration(), Some(2.0));
    assert_eq!(input.video_start_time(), Some(0.0));
    assert_eq!(input.audio_start_time(), None);
    // 上游报告 0, 按正方形像素处理
    assert_eq!(input.aspect_ratio(), Rational::ONE);
    assert_eq!(input.shape(), Some((8, 6)));
    assert_eq!(input.channels(), Some(2));
    assert_eq!(input.sample_rate(), Some(SAMPLE_RATE));
}

#[test]
fn test_无时间戳的单元() {
    let mut frame = VideoFrame::alloc(8, 6, PixelFormat::Yuv420p).unwrap();
    frame.pts = NOPTS_VALUE;
    let (decoder, _) = ScriptedDecoder::new(true, false, vec![video_unit(5), Ok(Frame::Video(frame))]);
    let mut input = AvInput::new(Box::new(decoder)).unwrap();

    input.read_video().unwrap();
    assert_eq!(input.pos(), Some(0.2));
    input.read_video().unwrap();
    assert_eq!(input.pos(), None);
}

#[test]
fn test_纯音频输入在首次定位时不报错() {
    init_test_logging();
    let (decoder, log) = ScriptedDecoder::new(false, true, interleaved_script(0));
    let mut input = AvInput::new(Box::new(decoder)).unwrap();

    input.set_pos(5.0).unwrap();
    assert_eq!(log.lock().unwrap().seeks, vec![5_000_000]);
    assert!(matches!(input.read(), Err(AvError::Eof)));
}

#[test]
fn test_首次定位前预读一帧视频() {
    init_test_logging();
    let (decoder, log) = ScriptedDecoder::new(true, true, interleaved_script(4));
    let mut input = AvInput::new(Box::new(decoder)).unwrap();

    // 预读消耗第一帧视频
    input.seek(0.08).unwrap();
    assert_eq!(input.pos(), Some(0.0));
    assert_eq!(log.lock().unwrap().seeks, vec![80_000]);

    // 脚本解码器不会真正跳转, 继续读到的是脚本中剩余的单元
    let frame = input.read_video().unwrap();
    assert_eq!(frame.pts, 3600);
    assert_eq!(input.read_audio().unwrap().pts, 0);
    assert_eq!(input.read_audio().unwrap().pts, 320);
}

#[test]
fn test_解码错误不重试() {
    let units = vec![
        video_unit(0),
        Err(AvError::Decode("损坏的数据包".into())),
        video_unit(1),
    ];
    let (decoder, _) = ScriptedDecoder::new(true, false, units);
    let mut input = AvInput::new(Box::new(decoder)).unwrap();

    input.read_video().unwrap();
    let err = input.read_video().unwrap_err();
    assert!(matches!(err, AvError::Decode(_)));
    assert!(!err.is_eof());
    // 调用方可以自行决定是否继续
    assert_eq!(input.read_video().unwrap().pts, 3600);
}

#[test]
fn test_解码器恰好释放一次() {
    let (decoder, log) = ScriptedDecoder::new(true, true, interleaved_script(2));
    let mut input = AvInput::new(Box::new(decoder)).unwrap();
    input.read_video().unwrap();
    input.close();
    input.close();
    assert!(matches!(input.read_audio(), Err(AvError::Closed)));
    drop(input);
    assert_eq!(log.lock().unwrap().released, 1);
}
