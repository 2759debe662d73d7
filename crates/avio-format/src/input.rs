//! 读会话.
//!
//! [`AvInput`] 独占一个上游解码器和一对视频/音频队列, 对调用方提供按流读取、
//! 位置查询与 seek. 解码器在会话关闭或析构时释放, 恰好一次.

use std::sync::Arc;

use avio_codec::{AudioFrame, MediaDecoder, Stream, VideoFrame};
use avio_core::timestamp::seconds_to_ticks;
use avio_core::{AvError, AvResult, MediaType, Rational, normalize};
use log::{debug, info};

use crate::demux::DemuxQueues;

/// 打开时记录的流信息
#[derive(Debug, Clone)]
struct InputInfo {
    name: String,
    video: Option<Stream>,
    audio: Option<Stream>,
    duration: i64,
}

/// [`AvInput::read`] 读出的单元
#[derive(Debug, Clone, PartialEq)]
pub enum InputUnit {
    /// 视频帧, 与会话保留的最近一帧共享像素数据
    Video(Arc<VideoFrame>),
    /// 音频块
    Audio(AudioFrame),
}

/// 读会话
pub struct AvInput {
    /// 关闭后为 `None`
    decoder: Option<Box<dyn MediaDecoder>>,
    info: InputInfo,
    queues: DemuxQueues,
    video_pos: Option<f64>,
    audio_pos: Option<f64>,
    has_read_video: bool,
    last_frame: Option<Arc<VideoFrame>>,
}

impl AvInput {
    /// 以上游解码器创建读会话
    ///
    /// 输入中既没有视频流也没有音频流时返回 `StreamNotFound`.
    pub fn new(decoder: Box<dyn MediaDecoder>) -> AvResult<Self> {
        let info = InputInfo {
            name: decoder.name().to_string(),
            video: decoder.video_stream().cloned(),
            audio: decoder.audio_stream().cloned(),
            duration: decoder.duration(),
        };
        if info.video.is_none() && info.audio.is_none() {
            return Err(AvError::StreamNotFound(MediaType::Video));
        }

        let time_base = |s: &Option<Stream>| s.as_ref().map_or(Rational::UNDEFINED, |s| s.time_base);
        let queues = DemuxQueues::new(time_base(&info.video), time_base(&info.audio));

        info!(
            "打开输入: {} (视频: {}, 音频: {})",
            info.name,
            info.video.is_some(),
            info.audio.is_some()
        );

        Ok(Self {
            decoder: Some(decoder),
            info,
            queues,
            video_pos: None,
            audio_pos: None,
            has_read_video: false,
            last_frame: None,
        })
    }

    /// 输入名称
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// 是否存在视频流
    pub fn has_video(&self) -> bool {
        self.info.video.is_some()
    }

    /// 是否存在音频流
    pub fn has_audio(&self) -> bool {
        self.info.audio.is_some()
    }

    /// 会话是否已关闭
    pub fn is_closed(&self) -> bool {
        self.decoder.is_none()
    }

    /// 读取下一个单元: 有视频流时读视频, 否则读音频
    pub fn read(&mut self) -> AvResult<InputUnit> {
        if self.has_video() {
            self.read_video().map(InputUnit::Video)
        } else {
            self.read_audio().map(InputUnit::Audio)
        }
    }

    /// 读取下一帧视频
    ///
    /// 等待期间解码出的音频块会缓存到音频队列中, 之后由 [`Self::read_audio`] 按序取出.
    /// 返回的帧与 [`Self::last_video_frame`] 共享同一份像素数据.
    pub fn read_video(&mut self) -> AvResult<Arc<VideoFrame>> {
        if !self.has_video() {
            return Err(AvError::StreamNotFound(MediaType::Video));
        }
        let decoder = self.decoder.as_deref_mut().ok_or(AvError::Closed)?;
        let entry = self.queues.dequeue_video(decoder)?;
        self.video_pos = entry.timestamp;
        self.has_read_video = true;
        let frame = Arc::new(entry.payload);
        self.last_frame = Some(Arc::clone(&frame));
        Ok(frame)
    }

    /// 读取下一块音频
    pub fn read_audio(&mut self) -> AvResult<AudioFrame> {
        if !self.has_audio() {
            return Err(AvError::StreamNotFound(MediaType::Audio));
        }
        let decoder = self.decoder.as_deref_mut().ok_or(AvError::Closed)?;
        let entry = self.queues.dequeue_audio(decoder)?;
        self.audio_pos = entry.timestamp;
        Ok(entry.payload)
    }

    /// 最近一次读出的视频帧
    pub fn last_video_frame(&self) -> Option<&VideoFrame> {
        self.last_frame.as_deref()
    }

    /// 最近读出的视频帧的时间 (秒)
    ///
    /// 尚未读过视频, 或最近一帧没有时间戳时为 `None`.
    pub fn video_pos(&self) -> Option<f64> {
        self.video_pos
    }

    /// 最近读出的音频块的时间 (秒)
    pub fn audio_pos(&self) -> Option<f64> {
        self.audio_pos
    }

    /// 等同于 [`Self::video_pos`]
    pub fn pos(&self) -> Option<f64> {
        self.video_pos()
    }

    /// 总时长 (秒), 按视频流时间基解释; 没有视频流时用音频流时间基
    pub fn duration(&self) -> Option<f64> {
        let stream = self.info.video.as_ref().or(self.info.audio.as_ref())?;
        normalize(self.info.duration, stream.time_base)
    }

    /// 视频流起始时间 (秒)
    pub fn video_start_time(&self) -> Option<f64> {
        start_time(self.info.video.as_ref())
    }

    /// 音频流起始时间 (秒)
    pub fn audio_start_time(&self) -> Option<f64> {
        start_time(self.info.audio.as_ref())
    }

    /// 定位到指定时间 (秒)
    ///
    /// 尚未读过任何视频帧时先尝试读一帧视频; 这次预读的失败被忽略.
    /// 底层 seek 成功后清空两个队列, 之后读到的都是定位点之后的数据.
    pub fn seek(&mut self, seconds: f64) -> AvResult<()> {
        let time_base = self
            .decoder
            .as_deref()
            .ok_or(AvError::Closed)?
            .container_time_base();
        let target = seconds_to_ticks(seconds, time_base)
            .ok_or_else(|| AvError::InvalidArgument(format!("无效的定位时间: {seconds}")))?;

        if !self.has_read_video {
            // 多数解封装器在读到第一个数据包之前拒绝 seek
            attempt_discarding_failure("seek 前预读视频帧", || self.read_video().map(drop));
        }

        let decoder = self.decoder.as_deref_mut().ok_or(AvError::Closed)?;
        debug!("定位到 {seconds}s (容器刻度 {target})");
        decoder.seek(target)?;
        self.queues.clear();
        Ok(())
    }

    /// 等同于 [`Self::seek`]
    pub fn set_pos(&mut self, seconds: f64) -> AvResult<()> {
        self.seek(seconds)
    }

    /// 视频宽高比
    ///
    /// 上游报告 0 (未指定) 或没有视频流时按正方形像素处理, 返回 1/1.
    pub fn aspect_ratio(&self) -> Rational {
        match self.video_params().map(|p| p.sample_aspect_ratio) {
            Some(ratio) if ratio.num != 0 && ratio.is_valid() => ratio,
            _ => Rational::ONE,
        }
    }

    /// 视频宽度
    pub fn width(&self) -> Option<u32> {
        self.video_params().map(|p| p.width)
    }

    /// 视频高度
    pub fn height(&self) -> Option<u32> {
        self.video_params().map(|p| p.height)
    }

    /// 视频尺寸 (宽, 高)
    pub fn shape(&self) -> Option<(u32, u32)> {
        self.video_params().map(|p| (p.width, p.height))
    }

    /// 视频帧率
    pub fn frame_rate(&self) -> Option<Rational> {
        self.video_params().map(|p| p.frame_rate)
    }

    /// 音频采样率
    pub fn sample_rate(&self) -> Option<u32> {
        self.info
            .audio
            .as_ref()
            .and_then(Stream::audio_params)
            .map(|p| p.sample_rate)
    }

    /// 音频声道数
    pub fn channels(&self) -> Option<u32> {
        self.info
            .audio
            .as_ref()
            .and_then(Stream::audio_params)
            .map(|p| p.channel_layout.channels)
    }

    /// 关闭会话, 释放上游解码器
    ///
    /// 之后的读取与 seek 都返回 `Closed`. 重复关闭无副作用.
    pub fn close(&mut self) {
        if self.decoder.take().is_some() {
            self.queues.clear();
            info!("关闭输入: {}", self.info.name);
        }
    }

    fn video_params(&self) -> Option<&avio_codec::VideoStreamParams> {
        self.info.video.as_ref().and_then(Stream::video_params)
    }
}

impl std::fmt::Debug for AvInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvInput")
            .field("name", &self.info.name)
            .field("closed", &self.is_closed())
            .field("video_pos", &self.video_pos)
            .field("audio_pos", &self.audio_pos)
            .finish()
    }
}

fn start_time(stream: Option<&Stream>) -> Option<f64> {
    stream.and_then(|s| normalize(s.start_time, s.time_base))
}

/// 执行一次尽力而为的操作, 失败只记录日志
fn attempt_discarding_failure(rationale: &str, op: impl FnOnce() -> AvResult<()>) {
    if let Err(err) = op() {
        debug!("{rationale}失败, 忽略: {err}");
    }
}
