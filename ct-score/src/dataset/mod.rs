//! 数据集操作.
//!
//! 数据目录下的每个条目被视为一个 case. 每个 case 目录下保存真值标签文件和
//! (由外部推理进程写出的) 预测标签文件.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::CaseFiles;

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}

/// 数据目录中的一个条目.
#[derive(Clone, Debug)]
pub struct CaseEntry {
    name: OsString,
    ground_truth: PathBuf,
    prediction: PathBuf,
}

impl CaseEntry {
    /// 以 `dir` 为 case 目录创建条目.
    pub fn new<P: AsRef<Path>>(dir: P, files: &CaseFiles) -> Self {
        let dir = dir.as_ref();
        Self {
            name: dir.file_name().map(OsString::from).unwrap_or_default(),
            ground_truth: dir.join(&files.ground_truth),
            prediction: dir.join(&files.prediction),
        }
    }

    /// 条目名.
    #[inline]
    pub fn name(&self) -> &Path {
        Path::new(&self.name)
    }

    /// 真值标签路径.
    #[inline]
    pub fn ground_truth(&self) -> &Path {
        &self.ground_truth
    }

    /// 预测标签路径.
    #[inline]
    pub fn prediction(&self) -> &Path {
        &self.prediction
    }

    /// 预测标签文件是否存在?
    #[inline]
    pub fn has_prediction(&self) -> bool {
        self.prediction.exists()
    }
}

/// 从数据目录 `dir` 创建 case 加载器.
///
/// `dir` 下的 **全部** 条目都会被迭代 (按文件名排序), 包括普通文件.
/// 这些条目没有预测标签, 在评估时会被当作缺少预测结果的 case.
///
/// 如果 `dir` 无法读取, 则返回 `Err`.
pub fn case_loader<P: AsRef<Path>>(dir: P, files: &CaseFiles) -> io::Result<CaseLoader> {
    let mut dirs = fs::read_dir(dir.as_ref())?
        .map(|e| e.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    dirs.sort();
    dirs.reverse();

    Ok(CaseLoader {
        dirs_rev: dirs,
        files: files.clone(),
    })
}

/// case 加载器.
#[derive(Debug)]
pub struct CaseLoader {
    dirs_rev: Vec<PathBuf>,
    files: CaseFiles,
}

impl Iterator for CaseLoader {
    type Item = CaseEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let dir = self.dirs_rev.pop()?;
        Some(CaseEntry::new(dir, &self.files))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.dirs_rev.len(), Some(self.dirs_rev.len()))
    }
}

impl ExactSizeIterator for CaseLoader {
    #[inline]
    fn len(&self) -> usize {
        self.dirs_rev.len()
    }
}
