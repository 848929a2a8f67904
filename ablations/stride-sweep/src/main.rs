//! 以不同的推理 stride 评估模型输出, 并将每个 stride 的汇总结果写入 CSV.

mod cli;
mod inference;
mod result;
mod runner;

use clap::Parser;
use simple_logger::SimpleLogger;

fn main() {
    let args = cli::CliArgs::parse();
    SimpleLogger::new()
        .with_level(args.log_level)
        .init()
        .expect("Logger initialization error");

    match runner::run(&args) {
        Ok(result) => {
            if let Err(e) = result.analyze() {
                log::error!("Failed to print summary: {e}");
            }
        }
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}
