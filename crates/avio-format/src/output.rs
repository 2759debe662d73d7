//! 写会话.
//!
//! [`AvOutput`] 独占一个上游编码器. 视频帧先转换成编码器要求的像素格式再转交;
//! 音频块经 [`AudioRebuffer`] 切成定长帧, 每凑满一帧立即交给编码器.

use avio_codec::{AudioFrame, MediaEncoder, VideoFrame};
use avio_core::{AvError, AvResult, MediaType};
use avio_scale::FrameConverter;
use log::{debug, info, warn};

use crate::config::OutputConfig;
use crate::rebuffer::AudioRebuffer;

/// 写会话
pub struct AvOutput {
    config: OutputConfig,
    /// 关闭后为 `None`
    encoder: Option<Box<dyn MediaEncoder>>,
    converter: FrameConverter,
    rebuffer: Option<AudioRebuffer>,
    video_frames: u64,
}

impl AvOutput {
    /// 以配置和上游编码器创建写会话
    ///
    /// 启用音频时, 编码器报告的帧大小决定了之后所有音频帧的长度, 会话期间不再改变.
    ///
    /// # 错误
    /// - `InvalidArgument`: 配置无效, 或编码器没有给出音频帧大小
    /// - `ShapeMismatch`: 编码器与配置的声道数不一致
    pub fn new(config: OutputConfig, encoder: Box<dyn MediaEncoder>) -> AvResult<Self> {
        config.validate()?;

        let rebuffer = match &config.audio {
            Some(audio) => {
                let frame_size = encoder.frame_size();
                if frame_size == 0 {
                    return Err(AvError::InvalidArgument(format!(
                        "编码器 {} 没有给出音频帧大小",
                        encoder.name()
                    )));
                }
                if encoder.channels() != audio.channels {
                    return Err(AvError::ShapeMismatch {
                        expected: format!("{} 声道", audio.channels),
                        actual: format!("{} 声道", encoder.channels()),
                    });
                }
                debug!("音频帧大小 = {frame_size} 采样");
                Some(AudioRebuffer::new(
                    frame_size,
                    audio.channels,
                    encoder.sample_format(),
                    audio.sample_rate,
                )?)
            }
            None => None,
        };

        let converter = FrameConverter::new(config.width, config.height, encoder.pixel_format());
        info!(
            "打开输出: {} ({}x{}, {} fps, 视频编码 {}, 音频: {})",
            config.destination,
            config.width,
            config.height,
            config.frame_rate,
            config.resolved_video_codec(),
            config.audio_enabled()
        );

        Ok(Self {
            config,
            encoder: Some(encoder),
            converter,
            rebuffer,
            video_frames: 0,
        })
    }

    /// 会话配置
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// 会话是否已关闭
    pub fn is_closed(&self) -> bool {
        self.encoder.is_none()
    }

    /// 编码器要求的音频帧大小, 未启用音频时为 `None`
    pub fn frame_size(&self) -> Option<u32> {
        self.rebuffer.as_ref().map(AudioRebuffer::frame_size)
    }

    /// 尚未凑满一帧的音频采样数
    pub fn pending_samples(&self) -> u32 {
        self.rebuffer.as_ref().map_or(0, AudioRebuffer::carry_fill)
    }

    /// 已写入的视频帧数
    pub fn video_frames_written(&self) -> u64 {
        self.video_frames
    }

    /// 写入一帧视频, 返回原帧以便链式调用
    ///
    /// 帧分辨率必须与配置一致; 像素格式不同时先转换.
    pub fn write_video<'a>(&mut self, frame: &'a VideoFrame) -> AvResult<&'a VideoFrame> {
        let encoder = self.encoder.as_deref_mut().ok_or(AvError::Closed)?;
        let converted = self.converter.convert(frame)?;
        encoder.encode_video(&converted)?;
        self.video_frames += 1;
        Ok(frame)
    }

    /// 等同于 [`Self::write_video`]
    pub fn write<'a>(&mut self, frame: &'a VideoFrame) -> AvResult<&'a VideoFrame> {
        self.write_video(frame)
    }

    /// 写入一块音频, 返回原块以便链式调用
    ///
    /// 声道数或采样格式不符时不写入任何数据. 编码器拒绝某一帧时返回其错误,
    /// 该帧及块内其后的采样留在进位缓冲区中, 下一次写入时重新转交.
    pub fn write_audio<'a>(&mut self, block: &'a AudioFrame) -> AvResult<&'a AudioFrame> {
        let encoder = self.encoder.as_deref_mut().ok_or(AvError::Closed)?;
        let rebuffer = self
            .rebuffer
            .as_mut()
            .ok_or(AvError::StreamNotFound(MediaType::Audio))?;
        rebuffer.push_with(block, |frame| encoder.encode_audio(frame))?;
        Ok(block)
    }

    /// 结束写入
    ///
    /// 调用编码器的 `finish()` 并释放编码器. 进位缓冲区中不足一帧的采样被丢弃.
    /// 之后的写入都返回 `Closed`; 重复关闭无副作用.
    pub fn close(&mut self) -> AvResult<()> {
        let Some(mut encoder) = self.encoder.take() else {
            return Ok(());
        };
        if let Some(rebuffer) = self.rebuffer.as_mut() {
            let dropped = rebuffer.discard_pending();
            if dropped > 0 {
                debug!("丢弃 {dropped} 个不足一帧的音频采样");
            }
        }
        let result = encoder.finish();
        info!(
            "关闭输出: {} (视频 {} 帧)",
            self.config.destination, self.video_frames
        );
        result
    }
}

impl Drop for AvOutput {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("关闭输出 {} 失败: {err}", self.config.destination);
        }
    }
}

impl std::fmt::Debug for AvOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvOutput")
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .field("video_frames", &self.video_frames)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use avio_core::{PixelFormat, SampleFormat};

    use super::*;
    use crate::config::AudioOutputConfig;

    #[derive(Default)]
    struct Record {
        video: Vec<VideoFrame>,
        audio: Vec<Vec<i16>>,
        finished: usize,
    }

    struct Recording {
        frame_size: u32,
        channels: u32,
        /// 接下来要拒绝的音频帧数
        reject_audio: usize,
        record: Arc<Mutex<Record>>,
    }

    impl MediaEncoder for Recording {
        fn name(&self) -> &str {
            "recording"
        }
        fn frame_size(&self) -> u32 {
            self.frame_size
        }
        fn channels(&self) -> u32 {
            self.channels
        }
        fn encode_video(&mut self, frame: &VideoFrame) -> AvResult<()> {
            self.record.lock().unwrap().video.push(frame.clone());
            Ok(())
        }
        fn encode_audio(&mut self, frame: &AudioFrame) -> AvResult<()> {
            if self.reject_audio > 0 {
                self.reject_audio -= 1;
                return Err(AvError::Encode("编码器暂时不可用".into()));
            }
            self.record.lock().unwrap().audio.push(frame.to_i16()?);
            Ok(())
        }
        fn finish(&mut self) -> AvResult<()> {
            self.record.lock().unwrap().finished += 1;
            Ok(())
        }
    }

    fn open(audio_channels: Option<u32>) -> (AvOutput, Arc<Mutex<Record>>) {
        let record = Arc::new(Mutex::new(Record::default()));
        let encoder = Recording {
            frame_size: 4,
            channels: audio_channels.unwrap_or(0),
            reject_audio: 0,
            record: Arc::clone(&record),
        };
        let mut config = OutputConfig::new("out.avi", 1_000_000, 4, 2, 25);
        if let Some(channels) = audio_channels {
            config = config.with_audio(AudioOutputConfig::new(64_000, 8000, channels));
        }
        (AvOutput::new(config, Box::new(encoder)).unwrap(), record)
    }

    #[test]
    fn test_音频按帧大小转交() {
        let (mut output, record) = open(Some(1));
        assert_eq!(output.frame_size(), Some(4));
        for chunk in [&[1i16, 2][..], &[3, 4, 5], &[6, 7, 8]] {
            let block = AudioFrame::from_i16(chunk, 1, 8000).unwrap();
            let returned = output.write_audio(&block).unwrap();
            assert_eq!(returned, &block);
        }
        assert_eq!(
            record.lock().unwrap().audio,
            vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]]
        );
        assert_eq!(output.pending_samples(), 0);
    }

    #[test]
    fn test_声道数不符不写入() {
        let (mut output, record) = open(Some(2));
        let block = AudioFrame::from_i16(&[1, 2, 3, 4, 5, 6, 7, 8], 1, 8000).unwrap();
        let err = output.write_audio(&block).unwrap_err();
        assert!(matches!(err, AvError::ShapeMismatch { .. }));
        assert!(record.lock().unwrap().audio.is_empty());
        assert_eq!(output.pending_samples(), 0);
    }

    #[test]
    fn test_编码失败后不丢帧() {
        let record = Arc::new(Mutex::new(Record::default()));
        let encoder = Recording {
            frame_size: 4,
            channels: 1,
            reject_audio: 1,
            record: Arc::clone(&record),
        };
        let config = OutputConfig::new("out.avi", 1_000_000, 4, 2, 25)
            .with_audio(AudioOutputConfig::new(64_000, 8000, 1));
        let mut output = AvOutput::new(config, Box::new(encoder)).unwrap();

        let all: Vec<i16> = (1..=12).collect();
        let err = output
            .write_audio(&AudioFrame::from_i16(&all, 1, 8000).unwrap())
            .unwrap_err();
        assert!(matches!(err, AvError::Encode(_)));
        assert!(record.lock().unwrap().audio.is_empty());
        assert_eq!(output.pending_samples(), 12);

        let block = AudioFrame::from_i16(&[13, 14, 15, 16], 1, 8000).unwrap();
        output.write_audio(&block).unwrap();
        assert_eq!(
            record.lock().unwrap().audio,
            vec![
                vec![1, 2, 3, 4],
                vec![5, 6, 7, 8],
                vec![9, 10, 11, 12],
                vec![13, 14, 15, 16]
            ]
        );
        assert_eq!(output.pending_samples(), 0);
    }

    #[test]
    fn test_未启用音频() {
        let (mut output, _) = open(None);
        let block = AudioFrame::from_i16(&[1], 1, 8000).unwrap();
        assert!(matches!(
            output.write_audio(&block),
            Err(AvError::StreamNotFound(MediaType::Audio))
        ));
    }

    #[test]
    fn test_视频转换后转交() {
        let (mut output, record) = open(None);
        let rgb = VideoFrame::from_packed(4, 2, PixelFormat::Rgb24, &[255u8; 24]).unwrap();
        assert_eq!(output.write(&rgb).unwrap(), &rgb);
        let yuv = VideoFrame::alloc(4, 2, PixelFormat::Yuv420p).unwrap();
        output.write_video(&yuv).unwrap();

        let record = record.lock().unwrap();
        assert_eq!(record.video.len(), 2);
        assert_eq!(record.video[0].pixel_format, PixelFormat::Yuv420p);
        assert_eq!(record.video[1], yuv);
        assert_eq!(output.video_frames_written(), 2);
    }

    #[test]
    fn test_视频分辨率不符() {
        let (mut output, record) = open(None);
        let frame = VideoFrame::alloc(8, 8, PixelFormat::Yuv420p).unwrap();
        assert!(matches!(
            output.write_video(&frame),
            Err(AvError::ShapeMismatch { .. })
        ));
        assert!(record.lock().unwrap().video.is_empty());
    }

    #[test]
    fn test_关闭时丢弃进位() {
        let (mut output, record) = open(Some(1));
        let block = AudioFrame::from_i16(&[1, 2, 3, 4, 5, 6], 1, 8000).unwrap();
        output.write_audio(&block).unwrap();
        assert_eq!(output.pending_samples(), 2);

        output.close().unwrap();
        output.close().unwrap();
        assert_eq!(output.pending_samples(), 0);
        let record = record.lock().unwrap();
        // 剩余的 [5, 6] 不会补零写出
        assert_eq!(record.audio, vec![vec![1, 2, 3, 4]]);
        assert_eq!(record.finished, 1);
        drop(record);
        assert!(matches!(output.write_audio(&block), Err(AvError::Closed)));
    }

    #[test]
    fn test_析构时结束编码() {
        let (output, record) = open(Some(1));
        drop(output);
        assert_eq!(record.lock().unwrap().finished, 1);
    }

    #[test]
    fn test_构造校验() {
        let record = Arc::new(Mutex::new(Record::default()));
        let config = OutputConfig::new("out.mp4", 1, 4, 2, 25).with_audio(AudioOutputConfig::default());

        let no_frame_size = Recording {
            frame_size: 0,
            channels: 2,
            reject_audio: 0,
            record: Arc::clone(&record),
        };
        assert!(matches!(
            AvOutput::new(config.clone(), Box::new(no_frame_size)),
            Err(AvError::InvalidArgument(_))
        ));

        let mono = Recording {
            frame_size: 1024,
            channels: 1,
            reject_audio: 0,
            record,
        };
        assert!(matches!(
            AvOutput::new(config, Box::new(mono)),
            Err(AvError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_采样格式由编码器决定() {
        let (mut output, _) = open(Some(1));
        let block = AudioFrame::from_bytes(vec![0u8; 16], 1, SampleFormat::F32, 8000).unwrap();
        assert!(matches!(
            output.write_audio(&block),
            Err(AvError::TypeMismatch { .. })
        ));
    }
}
