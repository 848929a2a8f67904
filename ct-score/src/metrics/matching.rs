//! 检测级质心匹配.
//!
//! 对每个真值质心, 只要存在一个预测质心与其距离 **严格小于** 容差, 就记为 TP,
//! 否则记为 FN. 匹配不是一对一的: 同一个预测质心可以同时命中多个真值质心.

use crate::consts::DEFAULT_TOLERANCE;
use crate::{ratio, Point3, Rate};

/// 两点之间的欧氏距离.
#[inline]
pub fn dist(a: &Point3, b: &Point3) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// 单个 case 的检测级匹配结果.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchResult {
    /// 被命中的真值质心个数.
    pub true_pos: u64,

    /// 预测质心个数减去 TP, 不小于 0.
    pub false_pos: u64,

    /// 未被命中的真值质心个数.
    pub false_neg: u64,

    /// `TP / (TP + FN)`. 分母为 0 时未定义.
    pub sensitivity: Rate,

    /// `TP / (TP + FP + FN)`, 其中 FP 为截断到 0 之后的值. 分母为 0 时未定义.
    pub iou: Rate,
}

impl MatchResult {
    /// 真值中不存在任何 (非噪声) 分量时的退化结果: 所有预测质心都是 FP,
    /// 比率均未定义.
    #[inline]
    pub fn degenerate(outputs: usize) -> Self {
        Self {
            true_pos: 0,
            false_pos: outputs as u64,
            false_neg: 0,
            sensitivity: None,
            iou: None,
        }
    }
}

/// 质心匹配器.
#[derive(Copy, Clone, Debug)]
pub struct CentroidMatcher {
    tolerance: f64,
}

impl Default for CentroidMatcher {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl CentroidMatcher {
    /// 以距离容差 `tolerance` (物理单位) 构建匹配器.
    ///
    /// `tolerance` 必须为有限正数, 否则返回 `None`.
    pub fn new(tolerance: f64) -> Option<Self> {
        (tolerance.is_finite() && tolerance > 0.0).then_some(Self { tolerance })
    }

    /// 距离容差.
    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// 匹配真值质心 `gt` 与预测质心 `outputs`.
    pub fn match_centroids(&self, gt: &[Point3], outputs: &[Point3]) -> MatchResult {
        if gt.is_empty() {
            return MatchResult::degenerate(outputs.len());
        }

        let true_pos = gt
            .iter()
            .filter(|g| outputs.iter().any(|o| dist(g, o) < self.tolerance))
            .count() as u64;
        let false_neg = gt.len() as u64 - true_pos;

        let outputs = outputs.len() as u64;
        if true_pos > outputs {
            log::warn!(
                "{true_pos} ground truth centroids matched only {outputs} predictions, \
                 false positives clamped to 0"
            );
        }
        let false_pos = outputs.saturating_sub(true_pos);

        MatchResult {
            true_pos,
            false_pos,
            false_neg,
            sensitivity: ratio(true_pos, true_pos + false_neg),
            iou: ratio(true_pos, true_pos + false_pos + false_neg),
        }
    }
}
