//! 时间戳与时间戳归一化.
//!
//! 上游解码器以整数刻度报告显示时间戳 (PTS), 刻度长度由流的时间基决定.
//! "未知时间戳" 由哨兵值 [`NOPTS_VALUE`] 表示, 这个哨兵只在本模块的边界上出现:
//! 归一化之后统一用 `Option<f64>` 表达 "无时间戳".

use crate::rational::Rational;
use std::fmt;

/// 表示 "未定义" 的原始时间戳值
pub const NOPTS_VALUE: i64 = i64::MIN;

/// 将原始时间戳按时间基换算为秒
///
/// - `pts` 为 [`NOPTS_VALUE`] 时返回 `None`
/// - 时间基分母为 0 时同样返回 `None`
/// - 否则返回 `pts * num / den`, 不做取整或截断
///
/// 纯函数, 同样的输入永远得到同样的结果.
pub fn normalize(pts: i64, time_base: Rational) -> Option<f64> {
    if pts == NOPTS_VALUE || !time_base.is_valid() {
        return None;
    }
    Some(pts as f64 * f64::from(time_base.num) / f64::from(time_base.den))
}

/// 将秒换算为指定时间基下的整数刻度 (四舍五入)
///
/// 时间基无效或结果不是有限数时返回 `None`.
pub fn seconds_to_ticks(seconds: f64, time_base: Rational) -> Option<i64> {
    if !time_base.is_valid() || time_base.num == 0 {
        return None;
    }
    let ticks = (seconds * f64::from(time_base.den) / f64::from(time_base.num)).round();
    if !ticks.is_finite() {
        return None;
    }
    Some(ticks as i64)
}

/// 时间戳
///
/// 包含一个整数值和对应的时间基.
/// 实际时间 (秒) = pts * time_base.num / time_base.den.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// 时间戳值, `NOPTS_VALUE` 表示未定义
    pub pts: i64,
    /// 时间基
    pub time_base: Rational,
}

impl Timestamp {
    /// 创建新的时间戳
    pub const fn new(pts: i64, time_base: Rational) -> Self {
        Self { pts, time_base }
    }

    /// 创建未定义的时间戳
    pub const fn none() -> Self {
        Self {
            pts: NOPTS_VALUE,
            time_base: Rational::UNDEFINED,
        }
    }

    /// 判断时间戳是否有效 (非 NOPTS_VALUE)
    pub const fn is_valid(&self) -> bool {
        self.pts != NOPTS_VALUE && self.time_base.is_valid()
    }

    /// 转换为秒, 无效时间戳返回 `None`
    pub fn seconds(&self) -> Option<f64> {
        normalize(self.pts, self.time_base)
    }

    /// 将时间戳重缩放到新的时间基
    ///
    /// 通过交叉乘法避免浮点精度损失:
    /// new_pts = pts * old_tb.num * new_tb.den / (old_tb.den * new_tb.num)
    pub fn rescale(&self, new_time_base: Rational) -> Self {
        if !self.is_valid() || !new_time_base.is_valid() {
            return Self::none();
        }
        let num = self.pts as i128 * i128::from(self.time_base.num) * i128::from(new_time_base.den);
        let den = i128::from(self.time_base.den) * i128::from(new_time_base.num);
        if den == 0 {
            return Self::none();
        }
        Self {
            pts: (num / den) as i64,
            time_base: new_time_base,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.seconds() {
            Some(secs) => write!(f, "{secs:.6}s"),
            None => write!(f, "NOPTS"),
        }
    }
}
