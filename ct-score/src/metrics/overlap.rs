//! 体素级重叠度: Dice 系数与 Jaccard 系数.
//!
//! 所有非零标签被视为同一个前景类别, 不做逐标签统计.

use std::fmt;
use std::str::FromStr;

use ndarray::Zip;

use crate::consts::label::is_foreground;
use crate::data::{LabelVolume, VolumeAttr};
use crate::error::{EvalError, EvalResult, UnknownOverlapMethod};

/// 重叠度计算方法.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverlapMethod {
    /// `2|A∩B| / (|A| + |B|)`.
    Dice,

    /// `|A∩B| / |A∪B|`.
    Jaccard,
}

impl FromStr for OverlapMethod {
    type Err = UnknownOverlapMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dice" => Ok(Self::Dice),
            "jaccard" => Ok(Self::Jaccard),
            other => Err(UnknownOverlapMethod(other.to_string())),
        }
    }
}

impl fmt::Display for OverlapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dice => f.write_str("dice"),
            Self::Jaccard => f.write_str("jaccard"),
        }
    }
}

/// 两个标签体前景体素集合的计数.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct OverlapCounts {
    /// `|A|`.
    pub a: usize,

    /// `|B|`.
    pub b: usize,

    /// `|A∩B|`.
    pub intersection: usize,
}

impl OverlapCounts {
    /// 统计两个已对齐标签体的前景计数.
    ///
    /// 如果二者形状不同, 返回 `Err(EvalError::GeometryMismatch)`.
    pub fn between(a: &LabelVolume, b: &LabelVolume) -> EvalResult<Self> {
        if a.shape() != b.shape() {
            return Err(EvalError::GeometryMismatch(a.shape(), b.shape()));
        }
        let mut counts = Self::default();
        Zip::from(a.data()).and(b.data()).for_each(|&pa, &pb| {
            let (fa, fb) = (is_foreground(pa), is_foreground(pb));
            counts.a += fa as usize;
            counts.b += fb as usize;
            counts.intersection += (fa && fb) as usize;
        });
        Ok(counts)
    }

    /// `|A∪B|`.
    #[inline]
    pub fn union(&self) -> usize {
        self.a + self.b - self.intersection
    }

    /// Dice 系数. 两个集合都为空时定义为 1.
    pub fn dice(&self) -> f64 {
        match self.a + self.b {
            0 => 1.0,
            total => 2.0 * self.intersection as f64 / total as f64,
        }
    }

    /// Jaccard 系数. 两个集合都为空时定义为 1.
    pub fn jaccard(&self) -> f64 {
        match self.union() {
            0 => 1.0,
            union => self.intersection as f64 / union as f64,
        }
    }

    /// 按 `method` 计算重叠度.
    #[inline]
    pub fn measure(&self, method: OverlapMethod) -> f64 {
        match method {
            OverlapMethod::Dice => self.dice(),
            OverlapMethod::Jaccard => self.jaccard(),
        }
    }
}

/// 计算两个已对齐标签体之间的重叠度.
pub fn overlap_measure(a: &LabelVolume, b: &LabelVolume, method: OverlapMethod) -> EvalResult<f64> {
    Ok(OverlapCounts::between(a, b)?.measure(method))
}

/// 以方法名 (`"dice"` 或 `"jaccard"`) 计算重叠度.
///
/// 方法名非法时记录一条警告并返回无效结果 `0.0`, 调用者需要自行检查该值.
pub fn overlap_measure_by_name(counts: &OverlapCounts, method: &str) -> f64 {
    match method.parse::<OverlapMethod>() {
        Ok(m) => counts.measure(m),
        Err(e) => {
            log::warn!("{e}");
            0.0
        }
    }
}
