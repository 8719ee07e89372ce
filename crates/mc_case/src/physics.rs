// crates/mc_case/src/physics.rs

//! 物理归一化
//!
//! 把有量纲的物理常数转换为参考尺度和无量纲相似组。
//! 链路: `PhysicalConstants` -> `ReferenceScales` -> `DimensionlessGroups`，
//! 全部是输入的纯函数，构造即验证，无副作用。
//!
//! # 公式
//!
//! - 特征声速 `c0 = sqrt(p0/rho0)`，特征速度 `uu = c0`
//! - 空化数 `Ca = (p0 - pv) / (rho0 * uu^2)`
//! - 韦伯数 `We = rho0 * uu^2 * R0ref / ss`
//! - 逆气泡雷诺数 `Re_inv = mul0 / (rho0 * uu * R0ref)`

use mc_foundation::float::{ensure_finite, safe_div, safe_sqrt};
use mc_foundation::validation::{check_positive, ValidationError, ValidationReport};
use serde::{Deserialize, Serialize};

use crate::error::CaseError;

// ============================================================================
// 物理常数
// ============================================================================

/// 有量纲物理常数（SI 单位）
///
/// 读入后不再修改。默认值对应水中气泡屏的标准算例。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// 参考长度 x0 [m]
    #[serde(default = "default_x0")]
    pub x0: f64,

    /// 参考压力 p0 [Pa]
    #[serde(default = "default_p0")]
    pub p0: f64,

    /// 参考密度 rho0 [kg/m³]
    #[serde(default = "default_rho0")]
    pub rho0: f64,

    /// 动力黏度 [Pa·s]
    #[serde(default = "default_viscosity")]
    pub viscosity: f64,

    /// 表面张力系数 [N/m]
    ///
    /// 取 1e-12 量级的占位值等价于关闭表面张力，仍须严格为正。
    #[serde(default = "default_surface_tension")]
    pub surface_tension: f64,

    /// 蒸汽压 [Pa]
    #[serde(default = "default_vapor_pressure")]
    pub vapor_pressure: f64,

    /// 参考气泡半径 R0ref [m]
    #[serde(default = "default_r0_ref")]
    pub r0_ref: f64,

    /// 液相 Tait 状态方程指数 n
    #[serde(default = "default_n_tait")]
    pub n_tait: f64,

    /// 液相 Tait 刚度 B [Pa]
    #[serde(default = "default_b_tait")]
    pub b_tait: f64,

    /// 气相比热比
    #[serde(default = "default_gamma_gas")]
    pub gamma_gas: f64,

    /// 无量纲环境压力，patch 压力的基准
    #[serde(default = "default_patm")]
    pub patm: f64,
}

fn default_x0() -> f64 {
    10.0e-6
}
fn default_p0() -> f64 {
    101_325.0
}
fn default_rho0() -> f64 {
    1.0e3
}
fn default_viscosity() -> f64 {
    1.002e-3
}
fn default_surface_tension() -> f64 {
    0.07275
}
fn default_vapor_pressure() -> f64 {
    2.3388e3
}
fn default_r0_ref() -> f64 {
    10.0e-6
}
fn default_n_tait() -> f64 {
    7.1
}
fn default_b_tait() -> f64 {
    306.0e6
}
fn default_gamma_gas() -> f64 {
    1.4
}
fn default_patm() -> f64 {
    1.0
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::water_air()
    }
}

impl PhysicalConstants {
    /// 水-空气体系的标准常数
    pub fn water_air() -> Self {
        Self {
            x0: default_x0(),
            p0: default_p0(),
            rho0: default_rho0(),
            viscosity: default_viscosity(),
            surface_tension: default_surface_tension(),
            vapor_pressure: default_vapor_pressure(),
            r0_ref: default_r0_ref(),
            n_tait: default_n_tait(),
            b_tait: default_b_tait(),
            gamma_gas: default_gamma_gas(),
            patm: default_patm(),
        }
    }

    /// 验证常数的物理有效性，收集全部错误
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        check_positive(&mut report, "x0", self.x0);
        check_positive(&mut report, "p0", self.p0);
        check_positive(&mut report, "rho0", self.rho0);
        check_positive(&mut report, "viscosity", self.viscosity);
        check_positive(&mut report, "surface_tension", self.surface_tension);
        check_positive(&mut report, "r0_ref", self.r0_ref);
        check_positive(&mut report, "patm", self.patm);

        if self.vapor_pressure < 0.0 || !self.vapor_pressure.is_finite() {
            report.add_error(ValidationError::OutOfRange {
                field: "vapor_pressure".to_string(),
                value: self.vapor_pressure,
                min: 0.0,
                max: f64::MAX,
            });
        }

        if self.p0 <= self.vapor_pressure {
            report.add_error(ValidationError::constraint(format!(
                "p0 ({}) 必须大于蒸汽压 pv ({})",
                self.p0, self.vapor_pressure
            )));
        }

        // Tait 指数须大于 1，否则 gamma = 1/(n-1) 发散
        if self.n_tait <= 1.0 {
            report.add_error(ValidationError::OutOfRange {
                field: "n_tait".to_string(),
                value: self.n_tait,
                min: 1.0,
                max: f64::MAX,
            });
        }
        if self.gamma_gas <= 1.0 {
            report.add_error(ValidationError::OutOfRange {
                field: "gamma_gas".to_string(),
                value: self.gamma_gas,
                min: 1.0,
                max: f64::MAX,
            });
        }
        if self.b_tait < 0.0 || !self.b_tait.is_finite() {
            report.add_error(ValidationError::OutOfRange {
                field: "b_tait".to_string(),
                value: self.b_tait,
                min: 0.0,
                max: f64::MAX,
            });
        }

        report
    }

    /// 归一化的 Tait 刚度 B/p0
    pub fn b_tait_normalized(&self) -> Result<f64, CaseError> {
        Ok(safe_div(self.b_tait, self.p0)?)
    }
}

// ============================================================================
// 参考尺度
// ============================================================================

/// 参考尺度
///
/// 特征声速、特征速度和特征时间，由物理常数一次性派生。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReferenceScales {
    /// 特征声速 c0 = sqrt(p0/rho0) [m/s]
    pub c0: f64,
    /// 特征速度 uu，按构造等于 c0 [m/s]
    pub uu: f64,
    /// 特征时间 t0 = x0/c0 [s]
    pub t0: f64,
}

impl ReferenceScales {
    /// 由物理常数派生参考尺度
    pub fn derive(constants: &PhysicalConstants) -> Result<Self, CaseError> {
        let report = constants.validate();
        if report.has_errors() {
            return Err(CaseError::Validation(report));
        }

        let c0 = safe_sqrt(safe_div(constants.p0, constants.rho0)?)?;
        let c0 = ensure_finite("c0", c0)?;
        let uu = c0;
        let t0 = ensure_finite("t0", safe_div(constants.x0, c0)?)?;

        Ok(Self { c0, uu, t0 })
    }
}

// ============================================================================
// 无量纲相似组
// ============================================================================

/// 无量纲相似组
///
/// 每个成员都是物理常数的纯函数，只派生，不修改。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionlessGroups {
    /// 空化数 Ca
    pub cavitation: f64,
    /// 韦伯数 We
    pub weber: f64,
    /// 逆气泡雷诺数 Re_inv
    pub reynolds_inv: f64,
}

impl DimensionlessGroups {
    /// 由物理常数和参考尺度派生相似组
    pub fn derive(
        constants: &PhysicalConstants,
        scales: &ReferenceScales,
    ) -> Result<Self, CaseError> {
        let uu2 = scales.uu * scales.uu;

        let cavitation = ensure_finite(
            "Ca",
            safe_div(constants.p0 - constants.vapor_pressure, constants.rho0 * uu2)?,
        )?;

        let weber = ensure_finite(
            "We",
            safe_div(
                constants.rho0 * uu2 * constants.r0_ref,
                constants.surface_tension,
            )?,
        )?;

        let reynolds_inv = ensure_finite(
            "Re_inv",
            safe_div(
                constants.viscosity,
                constants.rho0 * scales.uu * constants.r0_ref,
            )?,
        )?;

        Ok(Self {
            cavitation,
            weber,
            reynolds_inv,
        })
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mc_foundation::float::approx_eq_rel;

    #[test]
    fn test_water_air_is_valid() {
        let constants = PhysicalConstants::water_air();
        assert!(constants.validate().is_valid());
        assert!(approx_eq_rel(constants.patm, 1.0, 1e-12));
    }

    #[test]
    fn test_sound_speed() {
        let constants = PhysicalConstants::water_air();
        let scales = ReferenceScales::derive(&constants).unwrap();
        // c0 = sqrt(101325/1000) ≈ 10.066
        assert!(approx_eq_rel(scales.c0, 10.066, 1e-3));
        assert_eq!(scales.c0, scales.uu);
        assert!(approx_eq_rel(scales.t0, constants.x0 / scales.c0, 1e-12));
    }

    #[test]
    fn test_dimensionless_groups() {
        let constants = PhysicalConstants::water_air();
        let scales = ReferenceScales::derive(&constants).unwrap();
        let groups = DimensionlessGroups::derive(&constants, &scales).unwrap();

        // Ca = (101325 - 2338.8) / (1000 * 101.325) ≈ 0.9769
        assert!(approx_eq_rel(groups.cavitation, 0.9769, 1e-3));
        // We = 1000 * 101.325 * 1e-5 / 0.07275 ≈ 13.93
        assert!(approx_eq_rel(groups.weber, 13.93, 1e-2));
        // Re_inv = 1.002e-3 / (1000 * 10.066 * 1e-5) ≈ 9.954e-3
        assert!(approx_eq_rel(groups.reynolds_inv, 9.954e-3, 1e-2));
    }

    #[test]
    fn test_rejects_nonpositive_density() {
        let mut constants = PhysicalConstants::water_air();
        constants.rho0 = 0.0;
        assert!(!constants.validate().is_valid());
        assert!(ReferenceScales::derive(&constants).is_err());
    }

    #[test]
    fn test_rejects_pressure_below_vapor() {
        let mut constants = PhysicalConstants::water_air();
        constants.p0 = 1000.0;
        assert!(!constants.validate().is_valid());
    }

    #[test]
    fn test_rejects_zero_surface_tension() {
        let mut constants = PhysicalConstants::water_air();
        constants.surface_tension = 0.0;
        assert!(!constants.validate().is_valid());
    }

    #[test]
    fn test_placeholder_surface_tension_accepted() {
        // 1e-12 占位值表示关闭表面张力，不应被拒绝
        let mut constants = PhysicalConstants::water_air();
        constants.surface_tension = 1.0e-12;
        assert!(constants.validate().is_valid());
        let scales = ReferenceScales::derive(&constants).unwrap();
        let groups = DimensionlessGroups::derive(&constants, &scales).unwrap();
        assert!(groups.weber.is_finite());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut constants = PhysicalConstants::water_air();
        constants.rho0 = -1.0;
        constants.x0 = 0.0;
        let report = constants.validate();
        assert!(report.error_count() >= 2);
    }

    #[test]
    fn test_b_tait_normalized() {
        let constants = PhysicalConstants::water_air();
        let b = constants.b_tait_normalized().unwrap();
        assert!(approx_eq_rel(b, 306.0e6 / 101_325.0, 1e-12));
    }

    #[test]
    fn test_derivation_is_pure() {
        let constants = PhysicalConstants::water_air();
        let s1 = ReferenceScales::derive(&constants).unwrap();
        let s2 = ReferenceScales::derive(&constants).unwrap();
        assert_eq!(s1.c0, s2.c0);
        let g1 = DimensionlessGroups::derive(&constants, &s1).unwrap();
        let g2 = DimensionlessGroups::derive(&constants, &s2).unwrap();
        assert_eq!(g1.weber, g2.weber);
    }
}
