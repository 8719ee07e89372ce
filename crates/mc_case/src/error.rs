// crates/mc_case/src/error.rs

//! 算例层错误类型

use mc_foundation::float::NonFiniteError;
use mc_foundation::validation::ValidationReport;

/// 算例配置错误
#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("解析错误: {0}")]
    Parse(String),

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },

    /// 描述符键重复
    #[error("描述符键重复: '{0}'")]
    DuplicateKey(String),

    /// 缺失配置
    #[error("缺失配置: {0}")]
    Missing(String),

    /// 数值派生失败
    #[error("数值派生失败: {0}")]
    NonFinite(#[from] NonFiniteError),

    /// 验证失败（收集到的全部错误）
    #[error("验证失败: {0}")]
    Validation(ValidationReport),
}

impl CaseError {
    /// 构造无效值错误
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_error_display() {
        let err = CaseError::invalid_value("cfl", 1.5, "CFL 必须小于 1");
        assert!(err.to_string().contains("cfl"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_duplicate_key_display() {
        let err = CaseError::DuplicateKey("dt".to_string());
        assert!(err.to_string().contains("dt"));
    }
}
