//! 外部推理进程.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::cli::CliArgs;

/// 推理进程的启动参数. 每个 stride 启动一次.
#[derive(Clone, Debug)]
pub struct InferenceCommand {
    program: String,
    script: PathBuf,
    data_dir: PathBuf,
    model_path: PathBuf,
    checkpoint_path: PathBuf,
    batch_size: u32,
}

impl InferenceCommand {
    /// 根据命令行参数创建.
    pub fn new(args: &CliArgs, data_dir: &Path) -> Self {
        Self {
            program: args.program.clone(),
            script: args.script.clone(),
            data_dir: data_dir.to_path_buf(),
            model_path: args.model_path.clone(),
            checkpoint_path: args.checkpoint_path.clone(),
            batch_size: args.batch_size,
        }
    }

    /// 给定 `stride` 时传给解释器的全部参数.
    pub fn args(&self, stride: u32) -> Vec<OsString> {
        let batch_size = self.batch_size.to_string();
        let stride = stride.to_string();
        let options: [(&str, &OsStr); 6] = [
            ("--data_dir", self.data_dir.as_os_str()),
            ("--model_path", self.model_path.as_os_str()),
            ("--checkpoint_path", self.checkpoint_path.as_os_str()),
            ("--batch_size", OsStr::new(&batch_size)),
            ("--stride_inplane", OsStr::new(&stride)),
            ("--stride_layer", OsStr::new(&stride)),
        ];

        let mut v = vec![OsString::from(&self.script)];
        for (key, value) in options {
            v.push(key.into());
            v.push(value.into());
        }
        v
    }

    /// 以 `stride` 运行推理并阻塞至其结束.
    ///
    /// 进程无法启动或以非零状态退出时只记录日志, 不中断扫描.
    /// 返回进程是否成功结束.
    pub fn run(&self, stride: u32) -> bool {
        log::info!("Running inference with stride {stride}");
        match Command::new(&self.program).args(self.args(stride)).status() {
            Ok(status) if status.success() => true,
            Ok(status) => {
                log::warn!("Inference with stride {stride} exited with {status}");
                false
            }
            Err(e) => {
                log::warn!("Failed to launch `{}`: {e}", self.program);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::InferenceCommand;
    use crate::cli::CliArgs;
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn test_inference_args() {
        let args = CliArgs::try_parse_from(["stride-sweep", "--batch-size", "3"]).unwrap();
        let cmd = InferenceCommand::new(&args, Path::new("./data/evaluate"));
        let v: Vec<_> = cmd
            .args(24)
            .into_iter()
            .map(|s| s.into_string().unwrap())
            .collect();
        assert_eq!(
            v,
            [
                "./evaluate.py",
                "--data_dir",
                "./data/evaluate",
                "--model_path",
                "./tmp/ckpt/checkpoint-76245.meta",
                "--checkpoint_path",
                "./tmp/ckpt/checkpoint-76245",
                "--batch_size",
                "3",
                "--stride_inplane",
                "24",
                "--stride_layer",
                "24",
            ]
        );
    }

    #[test]
    fn test_inference_launch_failure() {
        let args = CliArgs::try_parse_from([
            "stride-sweep",
            "--program",
            "/nonexistent/interpreter-for-stride-sweep",
        ])
        .unwrap();
        let cmd = InferenceCommand::new(&args, Path::new("."));
        assert!(!cmd.run(20));
    }
}
