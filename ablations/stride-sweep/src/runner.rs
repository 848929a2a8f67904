//! 程序运行函数.

use std::io;
use std::path::PathBuf;

use ct_score::config::{CaseFiles, EvalConfig};
use ct_score::evaluate::{rate_to_display, Evaluator};
use utils::loader;

use crate::cli::CliArgs;
use crate::inference::InferenceCommand;
use crate::result::{CsvReport, SweepResult};

/// 闭区间 `[min, max]` 上步长为 `step` 的 stride 序列.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StrideRange {
    min: u32,
    max: u32,
    step: u32,
}

impl StrideRange {
    /// 要求 `step > 0` 且 `min <= max`, 否则返回 `None`.
    pub fn new(min: u32, max: u32, step: u32) -> Option<Self> {
        (step > 0 && min <= max).then_some(Self { min, max, step })
    }

    /// 依次产生每个 stride.
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        (self.min..=self.max).step_by(self.step as usize)
    }
}

/// 运行期间的致命错误. 单个 case 的错误不在此列.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// 参数不合法.
    #[error("{0}")]
    Args(String),

    /// 数据目录或报告文件无法访问.
    #[error("{}: {1}", .0.display())]
    Io(PathBuf, #[source] io::Error),
}

/// 实际运行.
pub fn run(args: &CliArgs) -> Result<SweepResult, RunError> {
    let strides = StrideRange::new(args.min_stride, args.max_stride, args.step).ok_or_else(|| {
        RunError::Args(format!(
            "invalid stride range {}..={} by {}",
            args.min_stride, args.max_stride, args.step
        ))
    })?;

    let config = EvalConfig {
        tolerance: args.tolerance,
        connectivity: args.connectivity,
        average: args.average_over,
        files: CaseFiles {
            ground_truth: args.ground_truth_file.clone(),
            prediction: args.prediction_file.clone(),
        },
    };
    let evaluator = Evaluator::new(&config)
        .ok_or_else(|| RunError::Args(format!("invalid tolerance {}", args.tolerance)))?;

    let data_dir = match args.data_dir.clone() {
        Some(d) => d,
        None => loader::data_dir_from_env_or_home()
            .ok_or_else(|| RunError::Args("cannot determine the data directory".to_string()))?,
    };
    if !data_dir.is_dir() {
        return Err(RunError::Io(
            data_dir,
            io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut csv =
        CsvReport::create(&args.output).map_err(|e| RunError::Io(args.output.clone(), e))?;
    let inference = InferenceCommand::new(args, &data_dir);

    let mut reports = Vec::new();
    for stride in strides.iter() {
        log::info!("Evaluation with stride {stride}");
        if !args.skip_inference {
            inference.run(stride);
        }

        let cases = loader::case_loader(&data_dir, &config.files)
            .map_err(|e| RunError::Io(data_dir.clone(), e))?;
        let report = evaluator.evaluate_stride(stride, cases);
        log::info!(
            "Stride {stride}: average sensitivity {}, average IoU {}",
            rate_to_display(report.sensitivity),
            rate_to_display(report.iou)
        );

        csv.push(&report)
            .map_err(|e| RunError::Io(args.output.clone(), e))?;
        reports.push(report);
    }

    Ok(SweepResult::from_iter(reports))
}
