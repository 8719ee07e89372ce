// crates/mc_case/src/acoustic.rs

//! 声学源（单极子）
//!
//! 可选的外部强迫项: 位置、方向、幅值与脉冲形状/长度。
//! 所有字段均为归一化单位，由配置层从有量纲输入换算。

use serde::{Deserialize, Serialize};

use crate::error::CaseError;

/// 脉冲波形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseShape {
    /// 正弦脉冲
    Sine,
    /// 高斯脉冲
    Gaussian,
    /// 方波脉冲
    Square,
}

impl PulseShape {
    /// 外部求解器使用的波形编码
    pub fn wire_code(self) -> i64 {
        match self {
            Self::Sine => 1,
            Self::Gaussian => 2,
            Self::Square => 3,
        }
    }
}

/// 单极子声学源，归一化单位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcousticSource {
    /// 源位置（无量纲坐标）
    pub location: f64,
    /// 传播方向
    pub direction: f64,
    /// 无量纲压力幅值
    pub magnitude: f64,
    /// 脉冲波形
    pub pulse: PulseShape,
    /// 脉冲个数
    pub pulse_count: u32,
    /// 无量纲脉冲长度
    pub length: f64,
}

impl AcousticSource {
    /// 校验源参数
    pub fn validate(&self) -> Result<(), CaseError> {
        if !self.location.is_finite() {
            return Err(CaseError::invalid_value(
                "Mono(1)%loc(1)",
                self.location,
                "源位置必须有限",
            ));
        }
        if !self.magnitude.is_finite() || self.magnitude <= 0.0 {
            return Err(CaseError::invalid_value(
                "Mono(1)%mag",
                self.magnitude,
                "幅值必须为正",
            ));
        }
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(CaseError::invalid_value(
                "Mono(1)%length",
                self.length,
                "脉冲长度必须为正",
            ));
        }
        if self.pulse_count == 0 {
            return Err(CaseError::invalid_value(
                "Mono(1)%npulse",
                self.pulse_count,
                "脉冲个数必须为正",
            ));
        }
        if !self.direction.is_finite() || self.direction == 0.0 {
            return Err(CaseError::invalid_value(
                "Mono(1)%dir",
                self.direction,
                "传播方向不能为零",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> AcousticSource {
        AcousticSource {
            location: -500.0,
            direction: 1.0,
            magnitude: 0.987,
            pulse: PulseShape::Sine,
            pulse_count: 1,
            length: 491.67,
        }
    }

    #[test]
    fn test_valid_source() {
        assert!(source().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_magnitude() {
        let mut s = source();
        s.magnitude = 0.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_direction() {
        let mut s = source();
        s.direction = 0.0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_pulses() {
        let mut s = source();
        s.pulse_count = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_pulse_wire_codes() {
        assert_eq!(PulseShape::Sine.wire_code(), 1);
        assert_eq!(PulseShape::Gaussian.wire_code(), 2);
        assert_eq!(PulseShape::Square.wire_code(), 3);
    }
}
