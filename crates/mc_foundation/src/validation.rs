// crates/mc_foundation/src/validation.rs

//! 运行时验证报告
//!
//! 收集式验证：一次遍历收集所有错误再整体报告，而不是在第一个错误处
//! 中止。算例文件往往同时存在多处问题，逐条修复重跑的体验很差。
//!
//! 验证失败是硬错误。任何错误都会阻止算例描述符的装配和派发。
//!
//! # 示例
//!
//! ```
//! use mc_foundation::validation::{ValidationReport, ValidationError};
//!
//! let rho0 = -1.0f64;
//! let mut report = ValidationReport::new();
//! if rho0 <= 0.0 {
//!     report.add_error(ValidationError::OutOfRange {
//!         field: "rho0".to_string(),
//!         value: rho0,
//!         min: 0.0,
//!         max: f64::MAX,
//!     });
//! }
//! assert!(!report.is_valid());
//! ```

use std::fmt;

/// 验证报告
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// 合并另一个报告
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }

    /// 清空报告
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// 无错误返回 Ok，否则把整个报告作为错误返回
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告: {} 个错误", self.error_count())?;
        for (i, err) in self.errors.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// 验证错误类型
#[derive(Debug, Clone)]
pub enum ValidationError {
    /// 非有限值
    NonFinite {
        /// 字段名称
        field: String,
        /// 非有限的数值
        value: f64,
    },
    /// 数值超出范围
    OutOfRange {
        /// 字段名称
        field: String,
        /// 实际值
        value: f64,
        /// 下界
        min: f64,
        /// 上界
        max: f64,
    },
    /// 跨字段约束被破坏
    Constraint {
        /// 约束描述
        message: String,
    },
    /// 自定义错误
    Custom {
        /// 自定义消息
        message: String,
    },
}

impl ValidationError {
    /// 构造跨字段约束错误
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            message: message.into(),
        }
    }

    /// 构造自定义错误
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { field, value } => {
                write!(f, "字段 {} = {} (非有限值)", field, value)
            }
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                write!(f, "字段 {} = {} 超出范围 [{}, {}]", field, value, min, max)
            }
            Self::Constraint { message } => {
                write!(f, "约束错误: {}", message)
            }
            Self::Custom { message } => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// 验证辅助函数
// ============================================================================

/// 检查值是否有限
pub fn check_finite(report: &mut ValidationReport, field: &str, value: f64) -> bool {
    if !value.is_finite() {
        report.add_error(ValidationError::NonFinite {
            field: field.to_string(),
            value,
        });
        false
    } else {
        true
    }
}

/// 检查值是否在范围内
pub fn check_range(
    report: &mut ValidationReport,
    field: &str,
    value: f64,
    min: f64,
    max: f64,
) -> bool {
    if value < min || value > max {
        report.add_error(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
        false
    } else {
        true
    }
}

/// 检查值是否严格为正
pub fn check_positive(report: &mut ValidationReport, field: &str, value: f64) -> bool {
    if !value.is_finite() {
        report.add_error(ValidationError::NonFinite {
            field: field.to_string(),
            value,
        });
        return false;
    }
    if value <= 0.0 {
        report.add_error(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min: 0.0,
            max: f64::MAX,
        });
        false
    } else {
        true
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_report_new() {
        let report = ValidationReport::new();
        assert!(!report.has_errors());
        assert!(report.is_valid());
    }

    #[test]
    fn test_validation_report_add_error() {
        let mut report = ValidationReport::new();
        report.add_error(ValidationError::custom("test error"));

        assert!(report.has_errors());
        assert_eq!(report.error_count(), 1);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_validation_report_merge() {
        let mut report1 = ValidationReport::new();
        report1.add_error(ValidationError::custom("error 1"));

        let mut report2 = ValidationReport::new();
        report2.add_error(ValidationError::custom("error 2"));

        report1.merge(report2);
        assert_eq!(report1.error_count(), 2);
    }

    #[test]
    fn test_validation_report_clear() {
        let mut report = ValidationReport::new();
        report.add_error(ValidationError::custom("error"));

        report.clear();
        assert!(!report.has_errors());
    }

    #[test]
    fn test_into_result() {
        let report = ValidationReport::new();
        assert!(report.into_result().is_ok());

        let mut report = ValidationReport::new();
        report.add_error(ValidationError::custom("bad"));
        assert!(report.into_result().is_err());
    }

    #[test]
    fn test_check_finite() {
        let mut report = ValidationReport::new();

        assert!(check_finite(&mut report, "c0", 10.06));
        assert!(!report.has_errors());

        assert!(!check_finite(&mut report, "c0", f64::NAN));
        assert!(report.has_errors());
    }

    #[test]
    fn test_check_range() {
        let mut report = ValidationReport::new();

        assert!(check_range(&mut report, "cfl", 0.1, 0.0, 1.0));
        assert!(!report.has_errors());

        assert!(!check_range(&mut report, "cfl", 1.5, 0.0, 1.0));
        assert!(report.has_errors());
    }

    #[test]
    fn test_check_positive() {
        let mut report = ValidationReport::new();

        assert!(check_positive(&mut report, "rho0", 1000.0));
        assert!(!check_positive(&mut report, "rho0", 0.0));
        assert!(!check_positive(&mut report, "rho0", -1.0));
        assert!(!check_positive(&mut report, "rho0", f64::NAN));
        assert_eq!(report.error_count(), 3);
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::OutOfRange {
            field: "p0".to_string(),
            value: -1.0,
            min: 0.0,
            max: f64::MAX,
        };
        let s = format!("{}", err);
        assert!(s.contains("p0"));
        assert!(s.contains("-1"));
    }

    #[test]
    fn test_report_display() {
        let mut report = ValidationReport::new();
        report.add_error(ValidationError::custom("test error"));

        let s = format!("{}", report);
        assert!(s.contains("1 个错误"));
        assert!(s.contains("test error"));
    }
}
