// apps/mc_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示版本、参考尺度和默认算例信息。

use anyhow::{Context, Result};
use clap::Args;
use mc_case::config::CaseConfig;
use mc_case::physics::{DimensionlessGroups, ReferenceScales};
use std::path::PathBuf;
use tracing::info;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 算例配置文件路径，缺省显示内置默认算例
    #[arg(short, long)]
    pub case: Option<PathBuf>,

    /// 显示参考尺度与无量纲数
    #[arg(long)]
    pub scales: bool,

    /// 显示算例配置概要
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== MicroCav 信息 ===");

    let config = match &args.case {
        Some(path) => CaseConfig::from_file(path)
            .with_context(|| format!("无法读取算例文件 {}", path.display()))?,
        None => CaseConfig::default(),
    };

    let show_all = !args.scales && !args.defaults;

    if args.scales || show_all {
        print_scales(&config)?;
    }

    if args.defaults || show_all {
        if args.scales || show_all {
            println!();
        }
        print_config_summary(&config);
    }

    Ok(())
}

fn print_scales(config: &CaseConfig) -> Result<()> {
    println!("=== 参考尺度 ===");
    println!("MicroCav CLI 版本: {}", env!("CARGO_PKG_VERSION"));

    let scales = ReferenceScales::derive(&config.constants).context("参考尺度派生失败")?;
    println!("c0 (参考声速): {:.6} m/s", scales.c0);
    println!("uu (参考速度): {:.6} m/s", scales.uu);
    println!("t0 (参考时间): {:.6e} s", scales.t0);

    let groups =
        DimensionlessGroups::derive(&config.constants, &scales).context("无量纲数派生失败")?;
    println!("\n=== 无量纲数 ===");
    println!("Ca (空化数): {:.6}", groups.cavitation);
    println!("We (Weber 数): {:.6}", groups.weber);
    println!("1/Re (逆 Reynolds 数): {:.6e}", groups.reynolds_inv);

    Ok(())
}

fn print_config_summary(config: &CaseConfig) {
    println!("=== 算例配置 ===");
    println!("网格单元数: {}", config.grid.nx);
    println!("域长: {} m", config.grid.domain_length_m);
    println!("CFL 目标: {}", config.grid.cfl);
    println!("物理波速: {} m/s", config.grid.physical_speed);
    println!("输出快照数: {}", config.grid.n_files);
    println!("patch 数: {}", config.patches.len());
    println!(
        "气泡模型: {}",
        if config.bubbles.enabled {
            "启用"
        } else {
            "禁用"
        }
    );
    println!(
        "声学源: {}",
        if config.acoustic.is_some() {
            "启用"
        } else {
            "禁用"
        }
    );
}
