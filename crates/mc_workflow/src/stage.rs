// crates/mc_workflow/src/stage.rs

//! 执行阶段与引擎模式
//!
//! 外部求解器由三个独立组件构成，按固定顺序依次执行。
//! 阶段名从命令行选择器解析，未知名称在派发任何外部进程
//! 之前即报错。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WorkflowError;

/// 外部求解器执行阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// 前处理，生成初始场
    PreProcess,
    /// 主模拟
    Simulation,
    /// 后处理，导出可视化数据
    PostProcess,
}

impl Stage {
    /// 全部阶段，按执行顺序
    pub const ALL: [Stage; 3] = [Self::PreProcess, Self::Simulation, Self::PostProcess];

    /// 外部组件目录名
    pub fn component_name(self) -> &'static str {
        match self {
            Self::PreProcess => "pre_process",
            Self::Simulation => "simulation",
            Self::PostProcess => "post_process",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.component_name())
    }
}

impl FromStr for Stage {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre_process" => Ok(Self::PreProcess),
            "simulation" => Ok(Self::Simulation),
            "post_process" => Ok(Self::PostProcess),
            other => Err(WorkflowError::UnknownStage(other.to_string())),
        }
    }
}

/// 引擎并行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// 串行执行
    Serial,
    /// 多进程并行执行
    Parallel,
}

impl EngineMode {
    /// 外部组件的模式参数
    pub fn as_arg(self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Parallel => "parallel",
        }
    }

    /// 阶段约束下的实际模式
    ///
    /// 前处理组件只有串行实现，请求并行时降级为串行。
    pub fn effective_for(self, stage: Stage) -> Self {
        if stage == Stage::PreProcess && self == Self::Parallel {
            tracing::info!("pre_process 仅支持串行执行，并行请求降级为串行");
            return Self::Serial;
        }
        self
    }
}

impl Default for EngineMode {
    fn default() -> Self {
        Self::Serial
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_arg())
    }
}

impl FromStr for EngineMode {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serial" => Ok(Self::Serial),
            "parallel" => Ok(Self::Parallel),
            other => Err(WorkflowError::UnknownEngineMode(other.to_string())),
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
