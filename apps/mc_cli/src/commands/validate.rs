// apps/mc_cli/src/commands/validate.rs

//! 算例验证命令
//!
//! 验证算例配置文件，可选执行完整装配以检查描述符一致性。

use anyhow::{bail, Context, Result};
use clap::Args;
use mc_case::config::CaseConfig;
use mc_case::error::CaseError;
use std::path::PathBuf;
use tracing::{error, info};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 算例配置文件路径，缺省验证内置默认算例
    #[arg(short, long)]
    pub case: Option<PathBuf>,

    /// 验证通过后继续执行完整装配
    #[arg(long)]
    pub assemble: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== MicroCav 算例验证 ===");

    let config = match &args.case {
        Some(path) => {
            println!("检查算例文件: {}", path.display());
            CaseConfig::from_file(path)
                .with_context(|| format!("无法读取算例文件 {}", path.display()))?
        }
        None => {
            println!("检查内置默认算例");
            CaseConfig::default()
        }
    };

    match config.validate() {
        Ok(()) => {}
        Err(CaseError::Validation(report)) => {
            println!("\n错误 ({}):", report.error_count());
            for err in &report.errors {
                error!("  ✗ {}", err);
                println!("  ✗ {}", err);
            }
            println!("\n✗ 验证失败");
            bail!("验证失败：发现 {} 个错误", report.error_count());
        }
        Err(other) => return Err(other.into()),
    }

    println!("  ✓ 算例配置有效");

    if args.assemble {
        let descriptor = config.build().context("算例装配失败")?;
        println!("  ✓ 描述符装配成功: {} 个键", descriptor.len());
    }

    println!("\n✓ 验证通过");
    Ok(())
}
