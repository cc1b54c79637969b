//! 横幅检测结果与跨周期的检测状态

use std::fmt;

/// 一次横幅检测的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Detection {
    pub found: bool,
    /// None 表示横幅存在但无法解析出折扣
    pub discount_percent: Option<u32>,
    /// None 表示无法解析出节省金额
    pub savings: Option<u64>,
}

impl Detection {
    pub fn absent() -> Self {
        Self::default()
    }

    /// 横幅存在时的折扣档位
    pub fn level(&self) -> Option<DiscountLevel> {
        if !self.found {
            return None;
        }
        Some(match self.discount_percent {
            Some(p) => DiscountLevel::Percent(p),
            None => DiscountLevel::Unknown,
        })
    }
}

/// 记录下来的折扣档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountLevel {
    Percent(u32),
    Unknown,
}

impl DiscountLevel {
    /// 用于计算溢价的折扣，未知时按 0 处理
    pub fn as_coupon_percent(self) -> f64 {
        match self {
            DiscountLevel::Percent(p) => p as f64,
            DiscountLevel::Unknown => 0.0,
        }
    }

    /// 横幅是否处于生效状态
    pub fn is_active(self) -> bool {
        !matches!(self, DiscountLevel::Percent(0))
    }
}

impl fmt::Display for DiscountLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountLevel::Percent(p) => write!(f, "{}", p),
            DiscountLevel::Unknown => write!(f, "unknown"),
        }
    }
}

/// 状态变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// 出现了与上次不同的折扣
    Found(DiscountLevel),
    /// 之前生效的横幅消失
    Gone,
    /// 无需通知
    Unchanged,
}

/// 进程内的检测状态，每个周期传入并返回更新后的值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionState {
    pub last_known: DiscountLevel,
}

impl Default for DetectionState {
    fn default() -> Self {
        Self {
            last_known: DiscountLevel::Percent(0),
        }
    }
}

impl DetectionState {
    /// 根据新的检测结果计算下一个状态和对应的变化
    pub fn observe(self, detection: &Detection) -> (DetectionState, Transition) {
        match detection.level() {
            Some(level) if level != self.last_known => {
                (DetectionState { last_known: level }, Transition::Found(level))
            }
            Some(_) => (self, Transition::Unchanged),
            None if self.last_known.is_active() => {
                (DetectionState::default(), Transition::Gone)
            }
            None => (self, Transition::Unchanged),
        }
    }
}
