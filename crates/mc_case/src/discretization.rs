// crates/mc_case/src/discretization.rs

//! 离散化规划
//!
//! 由无量纲域长、网格数和 CFL 目标派生稳定的空间/时间离散。
//! 输出节奏约束: 总步数被重算为输出间隔的整数倍，
//! `n_out * n_files == n_steps` 严格成立。
//!
//! # 算法
//!
//! 1. `dx = L / Nx`
//! 2. `dt = cfl * dx / (physical_speed / c0)`
//! 3. `Nt_raw = floor(T_final / dt)`
//! 4. `Nout = ceil(Nt_raw / Nfiles)`
//! 5. `Nt = Nout * Nfiles`（取代原始估计，实际模拟时长可能略有偏差）

use serde::{Deserialize, Serialize};

use crate::error::CaseError;

// ============================================================================
// 规划输入
// ============================================================================

/// 离散化规划输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscretizationInput {
    /// 无量纲域长 L
    pub domain_length: f64,
    /// 网格单元数 Nx
    pub nx: u32,
    /// CFL 目标，必须严格小于 1
    pub cfl: f64,
    /// 物理参考波速 [m/s]
    pub physical_speed: f64,
    /// 无量纲目标最终时间
    pub t_final: f64,
    /// 输出快照数 Nfiles
    pub n_files: u32,
    /// 可选横向轴，2D 算例使用
    #[serde(default)]
    pub transverse: Option<TransverseAxis>,
}

impl DiscretizationInput {
    /// 规划离散化，产出网格规格
    ///
    /// `Nt` 由取整后的输出间隔重算，不再对照原始最终时间复核，
    /// 实际覆盖的物理时长可能偏离 `t_final`。
    pub fn plan(&self, c0: f64) -> Result<GridSpec, CaseError> {
        if self.nx == 0 {
            return Err(CaseError::invalid_value("nx", self.nx, "网格单元数必须为正"));
        }
        if !self.cfl.is_finite() || self.cfl <= 0.0 || self.cfl >= 1.0 {
            return Err(CaseError::invalid_value(
                "cfl",
                self.cfl,
                "CFL 目标必须位于 (0, 1) 开区间",
            ));
        }
        if !self.physical_speed.is_finite() || self.physical_speed <= 0.0 {
            return Err(CaseError::invalid_value(
                "physical_speed",
                self.physical_speed,
                "物理波速必须为正",
            ));
        }
        if !self.domain_length.is_finite() || self.domain_length <= 0.0 {
            return Err(CaseError::invalid_value(
                "domain_length",
                self.domain_length,
                "域长必须为正",
            ));
        }
        if !self.t_final.is_finite() || self.t_final < 0.0 {
            return Err(CaseError::invalid_value(
                "t_final",
                self.t_final,
                "最终时间必须非负且有限",
            ));
        }
        if self.n_files == 0 {
            return Err(CaseError::invalid_value(
                "n_files",
                self.n_files,
                "输出快照数必须为正",
            ));
        }
        if !c0.is_finite() || c0 <= 0.0 {
            return Err(CaseError::invalid_value("c0", c0, "特征声速必须为正"));
        }
        if let Some(transverse) = &self.transverse {
            if transverse.ny == 0 {
                return Err(CaseError::invalid_value(
                    "transverse.ny",
                    transverse.ny,
                    "横向网格单元数必须为正",
                ));
            }
            if !transverse.length.is_finite() || transverse.length <= 0.0 {
                return Err(CaseError::invalid_value(
                    "transverse.length",
                    transverse.length,
                    "横向域长必须为正",
                ));
            }
        }

        let dx = self.domain_length / f64::from(self.nx);
        let dt = self.cfl * dx / (self.physical_speed / c0);
        if !dt.is_finite() || dt <= 0.0 {
            return Err(CaseError::invalid_value("dt", dt, "派生时间步非正或非有限"));
        }

        // Nt_raw == 0 是退化但合法的情形，不做时间推进
        let nt_raw = (self.t_final / dt).floor() as u64;
        let n_out = nt_raw.div_ceil(u64::from(self.n_files));
        let n_steps = n_out * u64::from(self.n_files);

        Ok(GridSpec {
            domain_length: self.domain_length,
            nx: self.nx,
            dx,
            dt,
            n_steps,
            n_out,
            n_files: self.n_files,
            transverse: self.transverse,
        })
    }
}

// ============================================================================
// 网格规格
// ============================================================================

/// 离散化规划结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSpec {
    /// 无量纲域长 L
    pub domain_length: f64,
    /// 网格单元数
    pub nx: u32,
    /// 网格间距 dx
    pub dx: f64,
    /// 时间步长 dt
    pub dt: f64,
    /// 总步数 Nt，恒为 `n_out * n_files`
    pub n_steps: u64,
    /// 输出间隔步数 Nout
    pub n_out: u64,
    /// 输出快照数 Nfiles
    pub n_files: u32,
    /// 可选横向轴
    pub transverse: Option<TransverseAxis>,
}

/// 横向轴（2D 域的 y 方向，以原点为中心）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransverseAxis {
    /// 无量纲横向域长
    pub length: f64,
    /// 横向网格单元数 Ny
    pub ny: u32,
}

impl TransverseAxis {
    /// 横向域起点
    pub fn domain_begin(&self) -> f64 {
        -0.5 * self.length
    }

    /// 横向域终点
    pub fn domain_end(&self) -> f64 {
        0.5 * self.length
    }
}

impl GridSpec {
    /// 实际的 Courant 数 `(physical_speed / c0) * dt / dx`
    pub fn courant_number(&self, physical_speed: f64, c0: f64) -> f64 {
        (physical_speed / c0) * self.dt / self.dx
    }

    /// 域起点（域以原点为中心）
    pub fn domain_begin(&self) -> f64 {
        -0.5 * self.domain_length
    }

    /// 域终点
    pub fn domain_end(&self) -> f64 {
        0.5 * self.domain_length
    }
}

// ============================================================================
// 脉冲时间窗
// ============================================================================

/// 由声脉冲参数派生无量纲最终时间
///
/// `Lpulse = fraction * Ldomain`，`Tpulse = Lpulse / physical_speed`，
/// `T_final = factor * Tpulse * c0 / x0`。
pub fn pulse_final_time(
    domain_length_m: f64,
    pulse_fraction: f64,
    physical_speed: f64,
    duration_factor: f64,
    c0: f64,
    x0: f64,
) -> Result<f64, CaseError> {
    if !pulse_fraction.is_finite() || pulse_fraction <= 0.0 {
        return Err(CaseError::invalid_value(
            "pulse_fraction",
            pulse_fraction,
            "脉冲长度比例必须为正",
        ));
    }
    if !duration_factor.is_finite() || duration_factor <= 0.0 {
        return Err(CaseError::invalid_value(
            "duration_factor",
            duration_factor,
            "时长倍数必须为正",
        ));
    }
    let l_pulse = pulse_fraction * domain_length_m;
    let t_pulse = l_pulse / physical_speed;
    let t_final = duration_factor * t_pulse * c0 / x0;
    if !t_final.is_finite() || t_final < 0.0 {
        return Err(CaseError::invalid_value(
            "t_final",
            t_final,
            "派生最终时间非法",
        ));
    }
    Ok(t_final)
}

// ============================================================================
// 测试
// ============================================================================
