// apps/mc_cli/src/main.rs

//! MicroCav 命令行界面
//!
//! 装配气泡多相流算例并派发外部求解器组件。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 4: Application**，只消费下层类型：
//! - `CaseConfig` 读取与验证算例文件
//! - `CaseDescriptor` 装配结果
//! - `ExternalRunner` 同步派发外部组件

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// MicroCav 算例装配与派发命令行工具
#[derive(Parser)]
#[command(name = "mc_cli")]
#[command(author = "MicroCav Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MicroCav bubbly flow case assembler", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 装配算例并派发外部组件
    Run(commands::run::RunArgs),
    /// 显示信息
    Info(commands::info::InfoArgs),
    /// 验证算例配置
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
