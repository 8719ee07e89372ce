// crates/mc_foundation/src/float.rs

//! 有限性保护和安全浮点运算
//!
//! 归一化链路中的每个派生量（声速、时间尺度、无量纲组）都必须有限。
//! 非有限值一旦进入字典就会以字符串形式写给外部组件，错误被推迟到
//! 求解阶段才暴露。这里的工具保证在装配前就拒绝它们。
//!
//! # 设计目标
//!
//! 1. **快速失败**: 非有限值立即返回错误，不做静默替换
//! 2. **可追溯**: 错误携带量的名称，便于定位是哪条公式产出了坏值
//!
//! # 示例
//!
//! ```
//! use mc_foundation::float::{safe_sqrt, safe_div, ensure_finite};
//!
//! let c0 = safe_sqrt(101325.0 / 1000.0).unwrap();
//! assert!(ensure_finite("c0", c0).is_ok());
//! assert!(safe_sqrt(-1.0).is_err());
//! assert!(safe_div(1.0, 0.0).is_err());
//! ```

use thiserror::Error;

// ============================================================================
// 数值常量
// ============================================================================

/// 浮点数相等性比较的默认容差
pub const DEFAULT_EPSILON: f64 = 1e-14;

/// 安全除法的最小分母阈值
pub const SAFE_DIV_EPSILON: f64 = 1e-14;

/// 回归测试使用的相对容差
pub const REGRESSION_REL_TOL: f64 = 1e-2;

// ============================================================================
// 非有限值错误
// ============================================================================

/// 非有限值错误
///
/// 携带产出坏值的量名，定位公式来源。
#[derive(Debug, Clone, Error)]
pub enum NonFiniteError {
    /// 派生量为 NaN 或无穷大
    #[error("量 '{name}' 非有限: {value}")]
    NonFinite {
        /// 量的名称（如 "c0"、"We"）
        name: String,
        /// 非法的浮点值
        value: f64,
    },
    /// 平方根的输入为负
    #[error("负数开平方: {value}")]
    NegativeSqrt {
        /// 负的输入值
        value: f64,
    },
    /// 除法分母过小
    #[error("分母接近零: {denominator}")]
    NearZeroDenominator {
        /// 过小的分母
        denominator: f64,
    },
}

// ============================================================================
// 保护函数
// ============================================================================

/// 检查浮点值有限，失败时携带量名返回错误
#[inline]
pub fn ensure_finite(name: &str, value: f64) -> Result<f64, NonFiniteError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NonFiniteError::NonFinite {
            name: name.to_string(),
            value,
        })
    }
}

/// 安全平方根，负输入或非有限输入返回错误
#[inline]
pub fn safe_sqrt(x: f64) -> Result<f64, NonFiniteError> {
    if !x.is_finite() {
        return Err(NonFiniteError::NonFinite {
            name: "sqrt 输入".to_string(),
            value: x,
        });
    }
    if x < 0.0 {
        return Err(NonFiniteError::NegativeSqrt { value: x });
    }
    Ok(x.sqrt())
}

/// 安全除法，分母接近零返回错误
#[inline]
pub fn safe_div(numerator: f64, denominator: f64) -> Result<f64, NonFiniteError> {
    if denominator.abs() < SAFE_DIV_EPSILON {
        return Err(NonFiniteError::NearZeroDenominator { denominator });
    }
    let result = numerator / denominator;
    if result.is_finite() {
        Ok(result)
    } else {
        Err(NonFiniteError::NonFinite {
            name: "商".to_string(),
            value: result,
        })
    }
}

/// 检查两个值是否近似相等（绝对容差）
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// 检查两个值是否近似相等（相对容差）
#[inline]
pub fn approx_eq_rel(a: f64, b: f64, rel_tol: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(f64::MIN_POSITIVE);
    (a - b).abs() / scale < rel_tol
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite_ok() {
        assert!(ensure_finite("x", 1.0).is_ok());
        assert!(ensure_finite("x", 0.0).is_ok());
        assert!(ensure_finite("x", -1e300).is_ok());
    }

    #[test]
    fn test_ensure_finite_rejects() {
        assert!(ensure_finite("x", f64::NAN).is_err());
        assert!(ensure_finite("x", f64::INFINITY).is_err());
        assert!(ensure_finite("x", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_ensure_finite_error_carries_name() {
        let err = ensure_finite("c0", f64::NAN).unwrap_err();
        assert!(format!("{}", err).contains("c0"));
    }

    #[test]
    fn test_safe_sqrt() {
        assert!((safe_sqrt(4.0).unwrap() - 2.0).abs() < DEFAULT_EPSILON);
        assert!(safe_sqrt(-4.0).is_err());
        assert!(safe_sqrt(f64::NAN).is_err());
        assert!((safe_sqrt(0.0).unwrap()).abs() < DEFAULT_EPSILON);
    }

    #[test]
    fn test_safe_div() {
        assert!((safe_div(10.0, 2.0).unwrap() - 5.0).abs() < DEFAULT_EPSILON);
        assert!(safe_div(1.0, 0.0).is_err());
        assert!(safe_div(1.0, 1e-300).is_err());
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(1.0, 1.0 + 1e-15, DEFAULT_EPSILON));
        assert!(!approx_eq(1.0, 1.1, DEFAULT_EPSILON));
    }

    #[test]
    fn test_approx_eq_rel() {
        // 声速回归值: sqrt(101325/1000) ≈ 10.066
        let c0 = safe_sqrt(101325.0 / 1000.0).unwrap();
        assert!(approx_eq_rel(c0, 10.06, REGRESSION_REL_TOL));
        assert!(!approx_eq_rel(c0, 11.0, REGRESSION_REL_TOL));
    }
}
