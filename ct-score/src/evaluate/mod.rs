//! 逐 case 评估以及单个 stride 下的汇总.

use std::path::Path;

use crate::components::ComponentExtractor;
use crate::config::{AveragePolicy, EvalConfig};
use crate::data::align::align_to;
use crate::data::LabelVolume;
use crate::dataset::CaseEntry;
use crate::error::{EvalError, EvalResult};
use crate::metrics::{CentroidMatcher, MatchResult, OverlapCounts};

mod aggregate;

pub use aggregate::{StrideAggregate, StrideReport};

/// 单个 case 的评估指标. 创建后不再修改.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaseMetrics {
    /// 体素级 Dice 系数.
    pub dice: f64,

    /// 体素级 Jaccard 系数.
    pub jaccard: f64,

    /// 检测级匹配结果.
    pub matched: MatchResult,
}

/// 数据目录中一个条目的评估结局.
#[derive(Debug)]
pub enum CaseOutcome {
    /// 成功评估.
    Scored(CaseMetrics),

    /// 预测标签文件不存在, 跳过.
    MissingOutput,

    /// 读取或对齐失败.
    Failed(EvalError),
}

impl CaseOutcome {
    /// 是否成功评估?
    #[inline]
    pub fn is_scored(&self) -> bool {
        matches!(self, Self::Scored(_))
    }
}

/// 评估器.
#[derive(Copy, Clone, Debug)]
pub struct Evaluator {
    extractor: ComponentExtractor,
    matcher: CentroidMatcher,
    average: AveragePolicy,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            extractor: ComponentExtractor::default(),
            matcher: CentroidMatcher::default(),
            average: AveragePolicy::default(),
        }
    }
}

impl Evaluator {
    /// 根据配置创建评估器. 如果容差不是有限正数, 返回 `None`.
    pub fn new(config: &EvalConfig) -> Option<Self> {
        Some(Self {
            extractor: ComponentExtractor::new(config.connectivity),
            matcher: CentroidMatcher::new(config.tolerance)?,
            average: config.average,
        })
    }

    /// 平均值分母的取法.
    #[inline]
    pub fn average(&self) -> AveragePolicy {
        self.average
    }

    /// 评估一对已经读入内存的标签体.
    ///
    /// `output` 的几何信息会先被覆写为 `ground_truth` 的几何信息.
    /// 真值中不存在非噪声分量时为退化 case: Dice 与 Jaccard 均记为 0,
    /// 匹配结果为 [`MatchResult::degenerate`].
    pub fn score(&self, ground_truth: &LabelVolume, output: LabelVolume) -> EvalResult<CaseMetrics> {
        let output = align_to(ground_truth, output)?;

        let counts = OverlapCounts::between(ground_truth, &output)?;
        let gt_centroids = self.extractor.centroids(ground_truth);
        let output_centroids = self.extractor.centroids(&output);

        if gt_centroids.is_empty() {
            return Ok(CaseMetrics {
                dice: 0.0,
                jaccard: 0.0,
                matched: MatchResult::degenerate(output_centroids.len()),
            });
        }

        Ok(CaseMetrics {
            dice: counts.dice(),
            jaccard: counts.jaccard(),
            matched: self
                .matcher
                .match_centroids(&gt_centroids, &output_centroids),
        })
    }

    /// 读取并评估一对标签文件.
    pub fn score_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        ground_truth: P,
        output: Q,
    ) -> EvalResult<CaseMetrics> {
        let gt = LabelVolume::open(ground_truth)?;
        let output = LabelVolume::open(output)?;
        self.score(&gt, output)
    }

    /// 评估数据目录中的一个条目. 不会因为单个 case 的错误而中断.
    pub fn evaluate_case(&self, case: &CaseEntry) -> CaseOutcome {
        let name = case.name().display();
        if !case.has_prediction() {
            log::warn!("Case `{name}`: no prediction at {}, skipped", case.prediction().display());
            return CaseOutcome::MissingOutput;
        }

        match self.score_files(case.ground_truth(), case.prediction()) {
            Ok(m) => {
                let r = &m.matched;
                log::debug!(
                    "Case `{name}`: TP {}, FP {}, TN 0, FN {}, sensitivity {}, IoU {}, \
                     Dice {:.6}, Jaccard {:.6}",
                    r.true_pos,
                    r.false_pos,
                    r.false_neg,
                    rate_to_display(r.sensitivity),
                    rate_to_display(r.iou),
                    m.dice,
                    m.jaccard,
                );
                CaseOutcome::Scored(m)
            }
            Err(e) => {
                log::warn!("Case `{name}`: {e}");
                CaseOutcome::Failed(e)
            }
        }
    }

    /// 评估 `stride` 下的全部条目并计算最终结果.
    pub fn evaluate_stride<I>(&self, stride: u32, cases: I) -> StrideReport
    where
        I: IntoIterator<Item = CaseEntry>,
    {
        let agg = cases
            .into_iter()
            .map(|case| self.evaluate_case(&case))
            .fold(StrideAggregate::new(stride), |agg, o| agg.fold(&o));

        if agg.missing() + agg.failed() > 0 {
            log::warn!(
                "Stride {stride}: {} missing and {} failed out of {} entries",
                agg.missing(),
                agg.failed(),
                agg.examined()
            );
        }
        agg.finalize(self.average)
    }
}

/// 以 `nan` 表示未定义的比率.
pub fn rate_to_display(r: crate::Rate) -> String {
    match r {
        Some(f) => format!("{f:.6}"),
        None => "nan".to_string(),
    }
}
