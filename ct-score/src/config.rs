//! 评估配置.

use std::fmt;
use std::str::FromStr;

use crate::components::Connectivity;
use crate::consts::{DEFAULT_TOLERANCE, GROUND_TRUTH_FILE, PREDICTION_FILE};

/// Dice / Jaccard 平均值的分母取法.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AveragePolicy {
    /// 以数据目录下的全部条目数为分母, 包括缺少预测结果或评估失败的 case.
    /// 这些 case 对分子贡献 0, 会拉低平均值.
    #[default]
    AllEntries,

    /// 只以成功评估的 case 数为分母.
    ScoredOnly,
}

impl FromStr for AveragePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entries" => Ok(Self::AllEntries),
            "scored" => Ok(Self::ScoredOnly),
            other => Err(format!("unknown averaging policy `{other}`")),
        }
    }
}

impl fmt::Display for AveragePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllEntries => f.write_str("entries"),
            Self::ScoredOnly => f.write_str("scored"),
        }
    }
}

/// case 目录下的文件名.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseFiles {
    /// 真值标签文件名.
    pub ground_truth: String,

    /// 预测标签文件名.
    pub prediction: String,
}

impl Default for CaseFiles {
    fn default() -> Self {
        Self {
            ground_truth: GROUND_TRUTH_FILE.to_string(),
            prediction: PREDICTION_FILE.to_string(),
        }
    }
}

/// 评估配置. `Default` 给出与原始评估流程一致的取值.
#[derive(Clone, Debug)]
pub struct EvalConfig {
    /// 质心匹配的距离容差 (物理单位).
    pub tolerance: f64,

    /// 连通分量的相邻规则.
    pub connectivity: Connectivity,

    /// 平均值分母的取法.
    pub average: AveragePolicy,

    /// case 目录下的文件名.
    pub files: CaseFiles,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            connectivity: Connectivity::default(),
            average: AveragePolicy::default(),
            files: CaseFiles::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AveragePolicy, EvalConfig};
    use crate::components::Connectivity;

    #[test]
    fn test_config_default() {
        let c = EvalConfig::default();
        assert_eq!(c.tolerance, 3.0);
        assert_eq!(c.connectivity, Connectivity::Face);
        assert_eq!(c.average, AveragePolicy::AllEntries);
        assert_eq!(c.files.ground_truth, "label_crop.nii.gz");
        assert_eq!(c.files.prediction, "label_vnet.nii.gz");
    }

    #[test]
    fn test_average_policy_parse() {
        assert_eq!("entries".parse(), Ok(AveragePolicy::AllEntries));
        assert_eq!("scored".parse(), Ok(AveragePolicy::ScoredOnly));
        assert!("mean".parse::<AveragePolicy>().is_err());
        assert_eq!(AveragePolicy::ScoredOnly.to_string(), "scored");
    }
}
