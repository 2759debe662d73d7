//! 音频重分块.
//!
//! 调用方交来的音频块长度任意, 而音频编码器每次只接受恰好 `frame_size` 个采样
//! (每声道) 的帧. [`AudioRebuffer`] 把任意长度的交错采样流切成定长帧,
//! 不足一帧的尾部留在进位缓冲区中, 与下一块拼接.
//!
//! 对同一个采样序列, 不论调用方如何分块, 产出的帧序列都完全相同.

use avio_codec::AudioFrame;
use avio_core::{AvError, AvResult, ChannelLayout, Rational, SampleFormat};
use bytes::{Buf, Bytes, BytesMut};
use log::{debug, trace};

/// 音频重分块器
///
/// 进位缓冲区容量为一帧, 其中的采样数 (`carry_fill`) 小于 `frame_size`;
/// 只有转交失败之后, 进位缓冲区才会暂存多于一帧的未转交采样.
#[derive(Debug)]
pub struct AudioRebuffer {
    frame_size: u32,
    channels: u32,
    sample_format: SampleFormat,
    sample_rate: u32,
    carry: BytesMut,
    /// 已产出的每声道采样总数, 用作下一帧的 PTS
    samples_emitted: i64,
}

impl AudioRebuffer {
    /// 创建重分块器
    ///
    /// # 参数
    /// - `frame_size`: 编码器每帧要求的每声道采样数
    /// - `channels`: 声道数
    /// - `sample_format`: 编码器要求的采样格式
    /// - `sample_rate`: 采样率, 产出帧的时间基为 `1/sample_rate`
    pub fn new(
        frame_size: u32,
        channels: u32,
        sample_format: SampleFormat,
        sample_rate: u32,
    ) -> AvResult<Self> {
        if frame_size == 0 {
            return Err(AvError::InvalidArgument("音频帧大小不能为 0".into()));
        }
        if channels == 0 {
            return Err(AvError::InvalidArgument("声道数不能为 0".into()));
        }
        if sample_format.bytes_per_sample() == 0 {
            return Err(AvError::InvalidArgument(format!(
                "无效的采样格式: {sample_format}"
            )));
        }
        let stride = channels as usize * sample_format.bytes_per_sample() as usize;
        Ok(Self {
            frame_size,
            channels,
            sample_format,
            sample_rate,
            carry: BytesMut::with_capacity(frame_size as usize * stride),
            samples_emitted: 0,
        })
    }

    /// 每帧的每声道采样数
    pub fn frame_size(&self) -> u32 {
        self.frame_size
    }

    /// 声道数
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// 采样格式
    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    /// 进位缓冲区中的每声道采样数
    pub fn carry_fill(&self) -> u32 {
        (self.carry.len() / self.stride()) as u32
    }

    /// 进位缓冲区中的原始交错内存
    pub fn carry_samples(&self) -> &[u8] {
        &self.carry
    }

    /// 已产出的每声道采样总数
    pub fn samples_emitted(&self) -> i64 {
        self.samples_emitted
    }

    /// 一个采样点 (全部声道) 的字节数
    fn stride(&self) -> usize {
        self.channels as usize * self.sample_format.bytes_per_sample() as usize
    }

    /// 检查音频块与重分块器配置是否一致
    ///
    /// # 错误
    /// - `ShapeMismatch`: 声道数不同, 或内存长度与采样数不符
    /// - `TypeMismatch`: 采样格式不同
    pub fn validate(&self, block: &AudioFrame) -> AvResult<()> {
        if block.channels() != self.channels {
            return Err(AvError::ShapeMismatch {
                expected: format!("{} 声道", self.channels),
                actual: format!("{} 声道", block.channels()),
            });
        }
        if block.sample_format != self.sample_format {
            return Err(AvError::TypeMismatch {
                expected: self.sample_format.to_string(),
                actual: block.sample_format.to_string(),
            });
        }
        let expected = block.nb_samples as usize * self.stride();
        if block.data.len() != expected {
            return Err(AvError::ShapeMismatch {
                expected: format!("{expected} 字节"),
                actual: format!("{} 字节", block.data.len()),
            });
        }
        Ok(())
    }

    /// 送入一块音频, 返回本次凑满的定长帧
    ///
    /// 校验失败时不产出任何帧, 进位缓冲区保持不变.
    pub fn push(&mut self, block: &AudioFrame) -> AvResult<Vec<AudioFrame>> {
        let mut frames = Vec::new();
        self.push_with(block, |frame| {
            frames.push(frame.clone());
            Ok(())
        })?;
        Ok(frames)
    }

    /// 送入一块音频, 每凑满一帧立即交给 `emit`
    ///
    /// `emit` 返回错误时停止切分: 失败的这一帧及其后尚未转交的采样全部放回进位缓冲区,
    /// PTS 计数不前进, 下一次送入时从失败的帧重新开始转交.
    pub fn push_with(
        &mut self,
        block: &AudioFrame,
        mut emit: impl FnMut(&AudioFrame) -> AvResult<()>,
    ) -> AvResult<()> {
        self.validate(block)?;

        let frame_bytes = self.frame_size as usize * self.stride();
        let mut remaining: Bytes = block.data.clone();
        let mut emitted = 0usize;

        loop {
            let data = if self.carry.len() >= frame_bytes {
                // 上次转交失败留下的整帧
                self.carry.split_to(frame_bytes).freeze()
            } else if self.carry.is_empty() && remaining.len() >= frame_bytes {
                // 进位为空时直接切出整帧, 不复制
                remaining.split_to(frame_bytes)
            } else if self.carry.len() + remaining.len() >= frame_bytes {
                let need = frame_bytes - self.carry.len();
                self.carry.extend_from_slice(&remaining[..need]);
                remaining.advance(need);
                let data = self.carry.split().freeze();
                self.carry.reserve(frame_bytes);
                data
            } else {
                break;
            };

            let frame = self.make_frame(data);
            if let Err(err) = emit(&frame) {
                self.restore(&frame.data, &remaining);
                debug!(
                    "音频帧转交失败, 保留 {} 个采样待重试: {err}",
                    self.carry_fill()
                );
                return Err(err);
            }
            self.samples_emitted += i64::from(self.frame_size);
            emitted += 1;
        }

        if !remaining.is_empty() {
            self.carry.extend_from_slice(&remaining);
        }
        trace!(
            "重分块: 输入 {} 采样, 产出 {} 帧, 进位 {} 采样",
            block.nb_samples,
            emitted,
            self.carry_fill()
        );
        Ok(())
    }

    /// 按原顺序把未转交的帧、进位与输入余量放回进位缓冲区
    fn restore(&mut self, frame: &[u8], remaining: &[u8]) {
        let mut restored =
            BytesMut::with_capacity(frame.len() + self.carry.len() + remaining.len());
        restored.extend_from_slice(frame);
        restored.extend_from_slice(&self.carry);
        restored.extend_from_slice(remaining);
        self.carry = restored;
    }

    /// 丢弃进位缓冲区中不足一帧的采样, 返回丢弃的每声道采样数
    pub fn discard_pending(&mut self) -> u32 {
        let dropped = self.carry_fill();
        self.carry.clear();
        dropped
    }

    /// 以当前采样计数为 PTS 组装一帧, 计数在转交成功后才前进
    fn make_frame(&self, data: Bytes) -> AudioFrame {
        AudioFrame {
            data,
            nb_samples: self.frame_size,
            sample_rate: self.sample_rate,
            sample_format: self.sample_format,
            channel_layout: ChannelLayout::from_channels(self.channels),
            pts: self.samples_emitted,
            time_base: Rational::new(1, self.sample_rate as i32),
        }
    }
}
