// apps/mc_cli/src/commands/run.rs

//! 运行命令
//!
//! 装配算例描述符并派发指定的外部组件阶段。

use anyhow::{Context, Result};
use clap::Args;
use mc_case::config::CaseConfig;
use mc_workflow::runner::{ComponentRunner, ExternalRunner};
use mc_workflow::stage::{EngineMode, Stage};
use std::path::PathBuf;
use tracing::info;

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 执行阶段 (pre_process, simulation, post_process)
    pub stage: String,

    /// 算例配置文件路径，缺省使用内置气泡屏默认算例
    #[arg(short, long)]
    pub case: Option<PathBuf>,

    /// 引擎模式 (serial, parallel)
    #[arg(short, long, default_value = "serial")]
    pub engine: String,

    /// 外部组件根目录
    #[arg(long, default_value = "../../src")]
    pub tool_dir: PathBuf,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== MicroCav 算例派发 ===");

    let stage: Stage = args.stage.parse()?;
    let mode: EngineMode = args.engine.parse()?;

    let config = load_config(args.case.as_deref())?;
    let descriptor = config.build().context("算例装配失败")?;
    info!("描述符装配完成: {} 个键", descriptor.len());

    let runner = ExternalRunner::new(&args.tool_dir);
    let report = runner
        .run(stage, &descriptor, mode)
        .with_context(|| format!("阶段 {} 派发失败", stage))?;

    info!(
        "阶段 {} 完成 ({}, {:.2} s)",
        report.stage,
        report.mode,
        report.elapsed_secs()
    );
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<CaseConfig> {
    match path {
        Some(path) => {
            info!("读取算例文件: {}", path.display());
            CaseConfig::from_file(path)
                .with_context(|| format!("无法读取算例文件 {}", path.display()))
        }
        None => {
            info!("未指定算例文件，使用内置默认算例");
            Ok(CaseConfig::default())
        }
    }
}
