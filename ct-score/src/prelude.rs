//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx3d, Point3, Rate};

pub use crate::data::align::align_to;
pub use crate::data::{Geometry, LabelVolume, VolumeAttr};

pub use crate::components::{Component, ComponentExtractor, Connectivity};
pub use crate::metrics::{CentroidMatcher, MatchResult, OverlapCounts, OverlapMethod};

pub use crate::config::{AveragePolicy, CaseFiles, EvalConfig};
pub use crate::consts::{GROUND_TRUTH_FILE, PREDICTION_FILE};

pub use crate::dataset::{self, case_loader, home_dataset_dir_with, CaseEntry};
pub use crate::evaluate::{CaseMetrics, CaseOutcome, Evaluator, StrideAggregate, StrideReport};

pub use crate::{EvalError, EvalResult};
