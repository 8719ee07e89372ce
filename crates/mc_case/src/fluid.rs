// crates/mc_case/src/fluid.rs

//! 流体物性记录与气泡参数
//!
//! 每相一条热力学闭合记录（stiffened-gas 形式），按相编号排序。
//! 启用气泡时，末位记录约定保留给气泡内气体。
//!
//! 闭合换算:
//! - 液相（Tait）: `gamma = 1/(n-1)`，`pi_inf = n*B/(n-1)`，B 已按 p0 归一
//! - 气相（理想气体）: `gamma = 1/(γ-1)`，`pi_inf = 0`

use serde::{Deserialize, Serialize};

use crate::error::CaseError;

// ============================================================================
// 物性记录
// ============================================================================

/// 单相热力学闭合记录
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluidPropertyRecord {
    /// 状态方程指数项 gamma
    pub gamma: f64,
    /// 状态方程刚度项 pi_inf（按 p0 归一）
    pub pi_inf: f64,
    /// 弹性剪切模量 G（亚弹性介质时存在）
    #[serde(default)]
    pub shear_modulus: Option<f64>,
}

impl FluidPropertyRecord {
    /// 由 Tait 参数构造液相记录
    ///
    /// `b_tait` 为按 p0 归一后的刚度。
    pub fn stiffened_liquid(n_tait: f64, b_tait: f64) -> Result<Self, CaseError> {
        if !n_tait.is_finite() || n_tait <= 1.0 {
            return Err(CaseError::invalid_value(
                "n_tait",
                n_tait,
                "Tait 指数必须大于 1",
            ));
        }
        if !b_tait.is_finite() || b_tait < 0.0 {
            return Err(CaseError::invalid_value(
                "b_tait",
                b_tait,
                "Tait 刚度必须非负",
            ));
        }
        Ok(Self {
            gamma: 1.0 / (n_tait - 1.0),
            pi_inf: n_tait * b_tait / (n_tait - 1.0),
            shear_modulus: None,
        })
    }

    /// 由比热比构造理想气体记录
    pub fn ideal_gas(gamma_gas: f64) -> Result<Self, CaseError> {
        if !gamma_gas.is_finite() || gamma_gas <= 1.0 {
            return Err(CaseError::invalid_value(
                "gamma_gas",
                gamma_gas,
                "比热比必须大于 1",
            ));
        }
        Ok(Self {
            gamma: 1.0 / (gamma_gas - 1.0),
            pi_inf: 0.0,
            shear_modulus: None,
        })
    }

    /// 附加弹性剪切模量
    pub fn with_shear_modulus(mut self, shear_modulus: f64) -> Result<Self, CaseError> {
        if !shear_modulus.is_finite() || shear_modulus < 0.0 {
            return Err(CaseError::invalid_value(
                "shear_modulus",
                shear_modulus,
                "剪切模量必须非负",
            ));
        }
        self.shear_modulus = Some(shear_modulus);
        Ok(self)
    }
}

// ============================================================================
// 气泡动力学参数
// ============================================================================

/// 气泡动力学模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BubbleModel {
    /// Gilmore 型
    Gilmore,
    /// Keller-Miksis 型
    KellerMiksis,
}

impl BubbleModel {
    /// 外部求解器使用的模型编码
    pub fn wire_code(self) -> i64 {
        match self {
            Self::Gilmore => 1,
            Self::KellerMiksis => 2,
        }
    }
}

/// 气泡动力学参数块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleParameters {
    /// 半径演化模型
    pub model: BubbleModel,
    /// 多方闭合（true 取 Rayleigh-Plesset 型简化模型）
    pub polytropic: bool,
    /// 多分散气泡谱
    pub polydisperse: bool,
    /// 参考气泡半径 [m]
    pub r0_ref: f64,
    /// 谱离散点数 nb
    pub bin_count: u32,
}

impl BubbleParameters {
    /// 校验参数
    pub fn validate(&self) -> Result<(), CaseError> {
        if !self.r0_ref.is_finite() || self.r0_ref <= 0.0 {
            return Err(CaseError::invalid_value(
                "R0ref",
                self.r0_ref,
                "参考气泡半径必须为正",
            ));
        }
        if self.bin_count == 0 {
            return Err(CaseError::invalid_value("nb", self.bin_count, "谱点数必须为正"));
        }
        if !self.polydisperse && self.bin_count != 1 {
            return Err(CaseError::invalid_value(
                "nb",
                self.bin_count,
                "单分散谱的 nb 必须为 1",
            ));
        }
        Ok(())
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
    fn test_stiffened_liquid_closure() {
        // n = 7.1, B = 306e6/101325 ≈ 3019.99
        let b = 306.0e6 / 101_325.0;
        let record = FluidPropertyRecord::stiffened_liquid(7.1, b).unwrap();
        assert!(approx_eq_rel(record.gamma, 1.0 / 6.1, 1e-12));
        assert!(approx_eq_rel(record.pi_inf, 7.1 * b / 6.1, 1e-12));
        assert!(record.shear_modulus.is_none());
    }

    #[test]
    fn test_ideal_gas_closure() {
        let record = FluidPropertyRecord::ideal_gas(1.4).unwrap();
        assert!(approx_eq_rel(record.gamma, 2.5, 1e-12));
        assert_eq!(record.pi_inf, 0.0);
    }

    #[test]
    fn test_rejects_degenerate_exponents() {
        assert!(FluidPropertyRecord::stiffened_liquid(1.0, 10.0).is_err());
        assert!(FluidPropertyRecord::stiffened_liquid(0.5, 10.0).is_err());
        assert!(FluidPropertyRecord::ideal_gas(1.0).is_err());
    }

    #[test]
    fn test_shear_modulus() {
        let record = FluidPropertyRecord::ideal_gas(1.4)
            .unwrap()
            .with_shear_modulus(1.0e9)
            .unwrap();
        assert_eq!(record.shear_modulus, Some(1.0e9));
        assert!(FluidPropertyRecord::ideal_gas(1.4)
            .unwrap()
            .with_shear_modulus(-1.0)
            .is_err());
    }

    #[test]
    fn test_bubble_model_codes() {
        assert_eq!(BubbleModel::Gilmore.wire_code(), 1);
        assert_eq!(BubbleModel::KellerMiksis.wire_code(), 2);
    }

    #[test]
    fn test_bubble_parameters_validate() {
        let params = BubbleParameters {
            model: BubbleModel::KellerMiksis,
            polytropic: true,
            polydisperse: false,
            r0_ref: 10.0e-6,
            bin_count: 1,
        };
        assert!(params.validate().is_ok());

        let mut bad = params.clone();
        bad.r0_ref = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = params.clone();
        bad.bin_count = 3;
        assert!(bad.validate().is_err());

        let mut poly = params;
        poly.polydisperse = true;
        poly.bin_count = 3;
        assert!(poly.validate().is_ok());
    }
}
