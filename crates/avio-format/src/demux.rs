//! 视频/音频双队列.
//!
//! 上游解码器只有一个 "解码下一个单元" 的入口, 视频帧与音频块按上游顺序交错产出.
//! `DemuxQueues` 把它们分流到两个独立的 FIFO 队列中, 入队时按各自流的时间基
//! 归一化时间戳. 等待某一路数据时, 另一路的单元会被顺带缓存下来.

use std::collections::VecDeque;

use avio_codec::{AudioFrame, Frame, MediaDecoder, VideoFrame};
use avio_core::{AvResult, MediaType, Rational, normalize};
use log::trace;

/// 带归一化时间戳的队列条目
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    /// 解码单元
    pub payload: T,
    /// 显示时间 (秒), 上游未提供时间戳时为 `None`
    pub timestamp: Option<f64>,
}

/// 视频/音频双队列
///
/// 两个队列都是无界 FIFO, 同一路内的出队顺序严格等于解码顺序.
#[derive(Debug)]
pub struct DemuxQueues {
    video: VecDeque<Timed<VideoFrame>>,
    audio: VecDeque<Timed<AudioFrame>>,
    video_time_base: Rational,
    audio_time_base: Rational,
}

impl DemuxQueues {
    /// 创建空队列, 记录两路流各自的时间基
    pub fn new(video_time_base: Rational, audio_time_base: Rational) -> Self {
        Self {
            video: VecDeque::new(),
            audio: VecDeque::new(),
            video_time_base,
            audio_time_base,
        }
    }

    /// 调用一次上游解码, 把结果放入对应的队列
    ///
    /// 返回入队单元的媒体类型. 上游的 `Eof` / 解码错误原样返回.
    pub fn enqueue_next(&mut self, decoder: &mut dyn MediaDecoder) -> AvResult<MediaType> {
        match decoder.decode_one()? {
            Frame::Video(frame) => {
                let timestamp = normalize(frame.pts, self.video_time_base);
                trace!("视频帧入队: pts={}, t={timestamp:?}", frame.pts);
                self.video.push_back(Timed {
                    payload: frame,
                    timestamp,
                });
                Ok(MediaType::Video)
            }
            Frame::Audio(block) => {
                let timestamp = normalize(block.pts, self.audio_time_base);
                trace!(
                    "音频块入队: pts={}, 采样数={}, t={timestamp:?}",
                    block.pts, block.nb_samples
                );
                self.audio.push_back(Timed {
                    payload: block,
                    timestamp,
                });
                Ok(MediaType::Audio)
            }
        }
    }

    /// 取出下一帧视频
    ///
    /// 视频队列为空时反复调用 [`Self::enqueue_next`], 期间产出的音频块进入音频队列.
    pub fn dequeue_video(&mut self, decoder: &mut dyn MediaDecoder) -> AvResult<Timed<VideoFrame>> {
        loop {
            if let Some(entry) = self.video.pop_front() {
                return Ok(entry);
            }
            self.enqueue_next(decoder)?;
        }
    }

    /// 取出下一块音频
    ///
    /// 音频队列为空时反复调用 [`Self::enqueue_next`], 期间产出的视频帧进入视频队列.
    pub fn dequeue_audio(&mut self, decoder: &mut dyn MediaDecoder) -> AvResult<Timed<AudioFrame>> {
        loop {
            if let Some(entry) = self.audio.pop_front() {
                return Ok(entry);
            }
            self.enqueue_next(decoder)?;
        }
    }

    /// 已缓存的视频帧数
    pub fn video_len(&self) -> usize {
        self.video.len()
    }

    /// 已缓存的音频块数
    pub fn audio_len(&self) -> usize {
        self.audio.len()
    }

    /// 清空两个队列
    pub fn clear(&mut self) {
        self.video.clear();
        self.audio.clear();
    }
}
