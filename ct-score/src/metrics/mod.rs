//! 单个 case 的评估指标: 体素级重叠度与检测级质心匹配.

pub mod matching;
pub mod overlap;

pub use matching::{CentroidMatcher, MatchResult};
pub use overlap::{OverlapCounts, OverlapMethod};
