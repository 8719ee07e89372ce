// crates/mc_workflow/src/error.rs

//! 工作流错误类型

use thiserror::Error;

/// 工作流层错误
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// 未知执行阶段
    #[error("未知执行阶段: '{0}'，可选 pre_process / simulation / post_process")]
    UnknownStage(String),

    /// 未知引擎模式
    #[error("未知引擎模式: '{0}'，可选 serial / parallel")]
    UnknownEngineMode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_input() {
        let err = WorkflowError::UnknownStage("post-process".to_string());
        assert!(err.to_string().contains("post-process"));

        let err = WorkflowError::UnknownEngineMode("mpi".to_string());
        assert!(err.to_string().contains("mpi"));
    }
}
