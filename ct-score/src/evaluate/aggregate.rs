//! 单个 stride 下全部 case 结果的汇总.

use super::{CaseMetrics, CaseOutcome};
use crate::config::AveragePolicy;
use crate::{ratio, Rate};

/// 某个 stride 下逐 case 累加的中间结果.
///
/// 通过 [`StrideAggregate::fold`] 逐个吸收 [`CaseOutcome`], 全部 case 处理完毕后
/// 由 [`StrideAggregate::finalize`] 计算平均值.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StrideAggregate {
    stride: u32,
    examined: usize,
    scored: usize,
    missing: usize,
    failed: usize,
    true_pos: u64,
    false_pos: u64,
    false_neg: u64,
    dice_sum: f64,
    jaccard_sum: f64,
}

impl StrideAggregate {
    /// 创建 `stride` 下的空汇总.
    #[inline]
    pub fn new(stride: u32) -> Self {
        Self {
            stride,
            ..Default::default()
        }
    }

    /// 吸收一个 case 的结果, 返回新的汇总.
    ///
    /// 无论结果如何, 该 case 都会计入已检查的条目数.
    #[must_use]
    pub fn fold(mut self, outcome: &CaseOutcome) -> Self {
        self.examined += 1;
        match outcome {
            CaseOutcome::Scored(m) => self.absorb(m),
            CaseOutcome::MissingOutput => self.missing += 1,
            CaseOutcome::Failed(_) => self.failed += 1,
        }
        self
    }

    fn absorb(&mut self, m: &CaseMetrics) {
        self.scored += 1;
        self.true_pos += m.matched.true_pos;
        self.false_pos += m.matched.false_pos;
        self.false_neg += m.matched.false_neg;
        self.dice_sum += m.dice;
        self.jaccard_sum += m.jaccard;
    }

    /// stride 值.
    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// 已检查的条目数.
    #[inline]
    pub fn examined(&self) -> usize {
        self.examined
    }

    /// 成功评估的 case 数.
    #[inline]
    pub fn scored(&self) -> usize {
        self.scored
    }

    /// 缺少预测结果的 case 数.
    #[inline]
    pub fn missing(&self) -> usize {
        self.missing
    }

    /// 评估失败的 case 数.
    #[inline]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// 计算最终结果.
    ///
    /// 检测级敏感度与 IoU 由累加后的 TP / FP / FN 直接计算, 而不是逐 case 比率的平均.
    /// Dice / Jaccard 平均值的分母由 `policy` 决定.
    pub fn finalize(self, policy: AveragePolicy) -> StrideReport {
        let den = match policy {
            AveragePolicy::AllEntries => self.examined,
            AveragePolicy::ScoredOnly => self.scored,
        };
        let mean = |sum: f64| (den != 0).then(|| sum / den as f64);

        let (tp, fp, fn_) = (self.true_pos, self.false_pos, self.false_neg);
        StrideReport {
            stride: self.stride,
            true_pos: tp,
            false_pos: fp,
            false_neg: fn_,
            sensitivity: ratio(tp, tp + fn_),
            iou: ratio(tp, tp + fp + fn_),
            dice: mean(self.dice_sum),
            jaccard: mean(self.jaccard_sum),
            examined: self.examined,
            scored: self.scored,
        }
    }
}

/// 某个 stride 的最终评估结果. 所有比率在分母为 0 时为 `None`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrideReport {
    /// stride 值.
    pub stride: u32,

    /// TP 总数.
    pub true_pos: u64,

    /// FP 总数.
    pub false_pos: u64,

    /// FN 总数.
    pub false_neg: u64,

    /// 目录级检测敏感度.
    pub sensitivity: Rate,

    /// 目录级检测 IoU.
    pub iou: Rate,

    /// Dice 平均值.
    pub dice: Rate,

    /// Jaccard 平均值.
    pub jaccard: Rate,

    /// 已检查的条目数.
    pub examined: usize,

    /// 成功评估的 case 数.
    pub scored: usize,
}
