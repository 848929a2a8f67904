//! 命令行参数.

use std::path::PathBuf;

use clap::Parser;
use ct_score::components::Connectivity;
use ct_score::config::AveragePolicy;
use ct_score::consts::{DEFAULT_TOLERANCE, GROUND_TRUTH_FILE, PREDICTION_FILE};
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    name = "stride-sweep",
    about = "Sweep the inference stride and score predicted label volumes against ground truth",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Directory holding one sub-directory per case
    /// [default: $CT_EVAL_DATA_DIR, then $HOME/dataset/evaluate]
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// CSV report path, replaced at start
    #[arg(long = "output", value_name = "FILE", default_value = "./tmp/result_stride.csv")]
    pub output: PathBuf,

    /// Smallest stride
    #[arg(long = "min-stride", default_value_t = 20)]
    pub min_stride: u32,

    /// Largest stride, inclusive
    #[arg(long = "max-stride", default_value_t = 30)]
    pub max_stride: u32,

    /// Stride increment
    #[arg(long = "step", default_value_t = 2)]
    pub step: u32,

    /// Centroid matching distance in physical units, exclusive
    #[arg(long = "tolerance", default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f64,

    /// Component adjacency: `face` (6) or `full` (26)
    #[arg(long = "connectivity", default_value = "face")]
    pub connectivity: Connectivity,

    /// Denominator of Dice / Jaccard averages: `entries` or `scored`
    #[arg(long = "average-over", default_value = "entries")]
    pub average_over: AveragePolicy,

    /// Ground truth file name inside each case directory
    #[arg(long = "ground-truth-file", default_value = GROUND_TRUTH_FILE)]
    pub ground_truth_file: String,

    /// Prediction file name inside each case directory, written by inference
    #[arg(long = "prediction-file", default_value = PREDICTION_FILE)]
    pub prediction_file: String,

    /// Interpreter of the inference script
    #[arg(long = "program", default_value = "python")]
    pub program: String,

    /// Inference script
    #[arg(long = "script", default_value = "./evaluate.py")]
    pub script: PathBuf,

    /// Model graph passed to the inference script
    #[arg(long = "model-path", default_value = "./tmp/ckpt/checkpoint-76245.meta")]
    pub model_path: PathBuf,

    /// Checkpoint passed to the inference script
    #[arg(long = "checkpoint-path", default_value = "./tmp/ckpt/checkpoint-76245")]
    pub checkpoint_path: PathBuf,

    /// Batch size passed to the inference script
    #[arg(long = "batch-size", default_value_t = 5)]
    pub batch_size: u32,

    /// Score existing predictions without running inference
    #[arg(long = "skip-inference")]
    pub skip_inference: bool,

    /// Log level
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: LevelFilter,
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::Parser;
    use ct_score::components::Connectivity;
    use ct_score::config::AveragePolicy;
    use log::LevelFilter;
    use std::path::Path;

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::try_parse_from(["stride-sweep"]).unwrap();
        assert_eq!(args.data_dir, None);
        assert_eq!(args.output, Path::new("./tmp/result_stride.csv"));
        assert_eq!((args.min_stride, args.max_stride, args.step), (20, 30, 2));
        assert_eq!(args.tolerance, 3.0);
        assert_eq!(args.connectivity, Connectivity::Face);
        assert_eq!(args.average_over, AveragePolicy::AllEntries);
        assert_eq!(args.ground_truth_file, "label_crop.nii.gz");
        assert_eq!(args.prediction_file, "label_vnet.nii.gz");
        assert_eq!(args.program, "python");
        assert_eq!(args.batch_size, 5);
        assert!(!args.skip_inference);
        assert_eq!(args.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_cli_overrides() {
        let args = CliArgs::try_parse_from([
            "stride-sweep",
            "--data-dir",
            "/data/evaluate",
            "--connectivity",
            "26",
            "--average-over",
            "scored",
            "--skip-inference",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.data_dir.as_deref(), Some(Path::new("/data/evaluate")));
        assert_eq!(args.connectivity, Connectivity::Full);
        assert_eq!(args.average_over, AveragePolicy::ScoredOnly);
        assert!(args.skip_inference);
        assert_eq!(args.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_cli_rejects_unknown_policy() {
        assert!(CliArgs::try_parse_from(["stride-sweep", "--average-over", "mean"]).is_err());
    }
}
