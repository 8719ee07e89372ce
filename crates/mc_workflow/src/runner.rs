// crates/mc_workflow/src/runner.rs

//! 外部组件运行器
//!
//! 将装配好的算例描述符以 JSON 形式写入外部组件的标准输入，
//! 同步阻塞等待组件结束。异常退出原样上报，不重试不转换。
//!
//! [`ComponentRunner`] trait 把派发抽象成同步能力接口，
//! 上层逻辑无需真实外部二进制即可测试。

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

use mc_case::descriptor::CaseDescriptor;
use mc_case::error::CaseError;

use crate::error::WorkflowError;
use crate::stage::{EngineMode, Stage};

/// 运行器错误
#[derive(Debug, Error)]
pub enum RunnerError {
    /// 工作流错误
    #[error("工作流错误: {0}")]
    Workflow(#[from] WorkflowError),

    /// 描述符序列化错误
    #[error("描述符序列化失败: {0}")]
    Descriptor(#[from] CaseError),

    /// IO 错误
    #[error("派发 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 组件非零退出
    #[error("组件 {stage} 异常退出，退出码 {code}")]
    ComponentFailed {
        /// 失败阶段
        stage: Stage,
        /// 进程退出码
        code: i32,
    },

    /// 组件被信号终止
    #[error("组件 {0} 被信号终止")]
    Terminated(Stage),
}

/// 单次派发的运行报告
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// 执行阶段
    pub stage: Stage,
    /// 实际引擎模式
    pub mode: EngineMode,
    /// 开始时刻
    pub started_at: DateTime<Utc>,
    /// 结束时刻
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// 运行时长（秒）
    pub fn elapsed_secs(&self) -> f64 {
        let delta = self.finished_at - self.started_at;
        delta.num_milliseconds() as f64 / 1000.0
    }
}

/// 同步组件派发接口
pub trait ComponentRunner {
    /// 派发单个阶段并阻塞等待其完成
    fn run(
        &self,
        stage: Stage,
        descriptor: &CaseDescriptor,
        mode: EngineMode,
    ) -> Result<RunReport, RunnerError>;
}

/// 派发真实外部组件的运行器
///
/// 每个阶段对应 `tool_dir` 下同名的可执行文件。描述符 JSON
/// 按插入顺序写入子进程标准输入，标准输出与标准错误直通。
#[derive(Debug, Clone)]
pub struct ExternalRunner {
    tool_dir: PathBuf,
}

impl ExternalRunner {
    /// 创建运行器，`tool_dir` 为外部组件根目录
    pub fn new(tool_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool_dir: tool_dir.into(),
        }
    }

    /// 阶段对应的可执行文件路径
    pub fn component_path(&self, stage: Stage) -> PathBuf {
        self.tool_dir.join(stage.component_name())
    }

    /// 组件根目录
    pub fn tool_dir(&self) -> &Path {
        &self.tool_dir
    }
}

impl ComponentRunner for ExternalRunner {
    fn run(
        &self,
        stage: Stage,
        descriptor: &CaseDescriptor,
        mode: EngineMode,
    ) -> Result<RunReport, RunnerError> {
        let mode = mode.effective_for(stage);
        let payload = descriptor.to_json_string()?;
        let program = self.component_path(stage);

        tracing::info!(
            stage = %stage,
            mode = %mode,
            program = %program.display(),
            keys = descriptor.len(),
            "派发外部组件"
        );

        let started_at = Utc::now();
        let mut child = Command::new(&program)
            .arg(mode.as_arg())
            .stdin(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(payload.as_bytes())?;
        }

        let status = child.wait()?;
        let finished_at = Utc::now();

        if !status.success() {
            return match status.code() {
                Some(code) => {
                    tracing::error!(stage = %stage, code, "组件异常退出");
                    Err(RunnerError::ComponentFailed { stage, code })
                }
                None => {
                    tracing::error!(stage = %stage, "组件被信号终止");
                    Err(RunnerError::Terminated(stage))
                }
            };
        }

        let report = RunReport {
            stage,
            mode,
            started_at,
            finished_at,
        };
        tracing::info!(
            stage = %stage,
            elapsed_secs = report.elapsed_secs(),
            "组件执行完成"
        );
        Ok(report)
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mc_case::config::CaseConfig;
    use std::cell::RefCell;

    fn descriptor() -> CaseDescriptor {
        CaseConfig::default().build().unwrap()
    }

    struct RecordingRunner {
        calls: RefCell<Vec<(Stage, EngineMode, usize)>>,
    }

    impl ComponentRunner for RecordingRunner {
        fn run(
            &self,
            stage: Stage,
            descriptor: &CaseDescriptor,
            mode: EngineMode,
        ) -> Result<RunReport, RunnerError> {
            let mode = mode.effective_for(stage);
            self.calls
                .borrow_mut()
                .push((stage, mode, descriptor.len()));
            let now = Utc::now();
            Ok(RunReport {
                stage,
                mode,
                started_at: now,
                finished_at: now,
            })
        }
    }

    #[test]
    fn test_trait_dispatch_without_external_binary() {
        let runner = RecordingRunner {
            calls: RefCell::new(Vec::new()),
        };
        let desc = descriptor();

        for stage in Stage::ALL {
            runner.run(stage, &desc, EngineMode::Parallel).unwrap();
        }

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 3);
        // 前处理被降级为串行，其余保持并行
        assert_eq!(calls[0], (Stage::PreProcess, EngineMode::Serial, desc.len()));
        assert_eq!(calls[1].1, EngineMode::Parallel);
        assert_eq!(calls[2].1, EngineMode::Parallel);
    }

    #[test]
    fn test_component_path_layout() {
        let runner = ExternalRunner::new("/opt/solver/bin");
        assert_eq!(
            runner.component_path(Stage::Simulation),
            PathBuf::from("/opt/solver/bin/simulation")
        );
        assert_eq!(
            runner.component_path(Stage::PreProcess),
            PathBuf::from("/opt/solver/bin/pre_process")
        );
    }

    #[test]
    fn test_missing_component_is_io_error() {
        let runner = ExternalRunner::new("/nonexistent/microcav-tools");
        let err = runner
            .run(Stage::Simulation, &descriptor(), EngineMode::Serial)
            .unwrap_err();
        assert!(matches!(err, RunnerError::Io(_)));
    }

    #[test]
    fn test_report_elapsed_non_negative() {
        let now = Utc::now();
        let report = RunReport {
            stage: Stage::PostProcess,
            mode: EngineMode::Serial,
            started_at: now,
            finished_at: now + chrono::Duration::milliseconds(1500),
        };
        assert!((report.elapsed_secs() - 1.5).abs() < 1e-9);
    }
}
