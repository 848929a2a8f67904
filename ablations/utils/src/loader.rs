//! 对 `ct-score::dataset` 的更一层封装. 提供更直接的数据集加载器.

use ct_score::config::CaseFiles;
use ct_score::dataset::{self, CaseLoader};
use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// 数据目录对应的环境变量名.
pub const DATA_DIR_ENV: &str = "CT_EVAL_DATA_DIR";

/// 获取评估数据目录.
///
/// 1. 若环境变量 `$CT_EVAL_DATA_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/evaluate`.
///
/// 二者都无法确定时返回 `None`.
pub fn data_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var_os(DATA_DIR_ENV) {
        Some(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => dataset::home_dataset_dir_with(["evaluate"]),
    }
}

/// 获取评估数据加载器.
#[inline]
pub fn case_loader<P: AsRef<Path>>(path: P, files: &CaseFiles) -> io::Result<CaseLoader> {
    dataset::case_loader(path, files)
}
