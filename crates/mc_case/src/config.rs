// crates/mc_case/src/config.rs

//! 算例文件配置
//!
//! JSON 算例文件的 serde 模型。所有字段都有默认值，空文件 `{}`
//! 即为水中气泡屏标准算例。加载流程: `from_file` -> 解析 ->
//! `validate`，验证收集全部错误后整体报告。
//!
//! `build()` 执行完整的派生链: 归一化 -> 离散化规划 -> patch 组合 ->
//! 描述符装配，产出交给外部求解器的 `CaseDescriptor`。

use mc_foundation::float::safe_div;
use mc_foundation::index::PatchIndex;
use mc_foundation::validation::{check_positive, check_range, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::acoustic::{AcousticSource, PulseShape};
use crate::descriptor::{CaseBuilder, CaseDescriptor};
use crate::discretization::{pulse_final_time, DiscretizationInput, TransverseAxis};
use crate::error::CaseError;
use crate::fluid::{BubbleModel, BubbleParameters, FluidPropertyRecord};
use crate::patch::{Patch, PatchGeometry, PatchSet};
use crate::physics::{DimensionlessGroups, PhysicalConstants, ReferenceScales};

// ============================================================================
// 网格与脉冲配置
// ============================================================================

/// 网格与时间推进配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// 网格单元数 Nx
    #[serde(default = "default_nx")]
    pub nx: u32,

    /// 域长 [m]
    #[serde(default = "default_domain_length")]
    pub domain_length_m: f64,

    /// CFL 目标，必须严格小于 1
    #[serde(default = "default_cfl")]
    pub cfl: f64,

    /// 物理参考波速 [m/s]
    #[serde(default = "default_physical_speed")]
    pub physical_speed: f64,

    /// 输出快照数 Nfiles
    #[serde(default = "default_n_files")]
    pub n_files: u32,

    /// 可选横向轴，2D 算例使用
    #[serde(default)]
    pub transverse: Option<TransverseConfig>,
}

/// 横向轴配置（2D 算例的 y 方向）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransverseConfig {
    /// 横向网格单元数 Ny
    pub ny: u32,

    /// 横向域长 [m]
    pub domain_length_m: f64,
}

fn default_nx() -> u32 {
    100
}
fn default_domain_length() -> f64 {
    20.0e-3
}
fn default_cfl() -> f64 {
    0.1
}
fn default_physical_speed() -> f64 {
    1475.0
}
fn default_n_files() -> u32 {
    20
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nx: default_nx(),
            domain_length_m: default_domain_length(),
            cfl: default_cfl(),
            physical_speed: default_physical_speed(),
            n_files: default_n_files(),
            transverse: None,
        }
    }
}

/// 脉冲时间窗配置，决定目标最终时间
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseConfig {
    /// 脉冲长度占域长的比例
    #[serde(default = "default_length_fraction")]
    pub length_fraction: f64,

    /// 最终时间相对脉冲穿越时间的倍数
    #[serde(default = "default_duration_factor")]
    pub duration_factor: f64,
}

fn default_length_fraction() -> f64 {
    0.3
}
fn default_duration_factor() -> f64 {
    2.5
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            length_fraction: default_length_fraction(),
            duration_factor: default_duration_factor(),
        }
    }
}

// ============================================================================
// patch 配置
// ============================================================================

/// 单个 patch 的算例文件表示，几何量为有量纲 [m]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchConfig {
    /// 几何类型
    #[serde(default = "default_geometry")]
    pub geometry: PatchGeometry,

    /// 形心坐标 [m]
    pub centroid_m: Vec<f64>,

    /// 尺度（方向长度或半径）[m]
    pub extent_m: Vec<f64>,

    /// 无量纲速度分量
    #[serde(default = "default_patch_velocity")]
    pub velocity: Vec<f64>,

    /// 无量纲压力
    #[serde(default = "default_patch_pressure")]
    pub pressure: f64,

    /// 液相密度 [kg/m³]
    #[serde(default = "default_liquid_density")]
    pub liquid_density: f64,

    /// 气泡空隙率 alpha
    #[serde(default = "default_void_fraction")]
    pub void_fraction: f64,

    /// 无量纲初始气泡半径
    #[serde(default = "default_bubble_radius")]
    pub bubble_radius: f64,

    /// 无量纲初始气泡壁速度
    #[serde(default)]
    pub bubble_velocity: f64,

    /// 覆盖的既有 patch 编号（1 起始）；省略表示基底区域
    #[serde(default)]
    pub alters: Option<u32>,
}

fn default_geometry() -> PatchGeometry {
    PatchGeometry::LineSegment
}
fn default_patch_velocity() -> Vec<f64> {
    vec![0.0]
}
fn default_patch_pressure() -> f64 {
    1.0
}
fn default_liquid_density() -> f64 {
    1.0e3
}
fn default_void_fraction() -> f64 {
    1.0e-12
}
fn default_bubble_radius() -> f64 {
    1.0
}

fn default_patches() -> Vec<PatchConfig> {
    vec![
        // 基底: 纯液体背景，空隙率取占位最小值
        PatchConfig {
            geometry: PatchGeometry::LineSegment,
            centroid_m: vec![0.0],
            extent_m: vec![20.0e-3],
            velocity: vec![0.0],
            pressure: 1.0,
            liquid_density: 1.0e3,
            void_fraction: 1.0e-12,
            bubble_radius: 1.0,
            bubble_velocity: 0.0,
            alters: None,
        },
        // 气泡屏: 覆盖域中央的含泡区域
        PatchConfig {
            geometry: PatchGeometry::LineSegment,
            centroid_m: vec![0.0],
            extent_m: vec![5.0e-3],
            velocity: vec![0.0],
            pressure: 1.0,
            liquid_density: 1.0e3,
            void_fraction: 4.0e-5,
            bubble_radius: 1.0,
            bubble_velocity: 0.0,
            alters: Some(1),
        },
    ]
}

impl PatchConfig {
    /// 换算为归一化 patch
    pub fn to_patch(
        &self,
        constants: &PhysicalConstants,
        bubbles_enabled: bool,
    ) -> Result<Patch, CaseError> {
        let x0 = constants.x0;
        let centroid = self.centroid_m.iter().map(|c| c / x0).collect();
        let extent = self.extent_m.iter().map(|e| e / x0).collect();
        let partial_density = (1.0 - self.void_fraction) * self.liquid_density / constants.rho0;
        let alters = match self.alters {
            None => None,
            Some(raw) => Some(PatchIndex::new(raw).ok_or_else(|| {
                CaseError::invalid_value("alters", raw, "patch 编号从 1 开始")
            })?),
        };
        Ok(Patch {
            geometry: self.geometry,
            centroid,
            extent,
            velocity: self.velocity.clone(),
            pressure: self.pressure,
            partial_density: vec![partial_density],
            volume_fraction: vec![self.void_fraction],
            bubble_radius: bubbles_enabled.then_some(self.bubble_radius),
            bubble_velocity: bubbles_enabled.then_some(self.bubble_velocity),
            alters,
        })
    }
}

// ============================================================================
// 气泡与声学配置
// ============================================================================

/// 气泡动力学配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BubbleConfig {
    /// 是否启用气泡
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 半径演化模型
    #[serde(default = "default_bubble_model")]
    pub model: BubbleModel,

    /// 多方闭合
    #[serde(default = "default_true")]
    pub polytropic: bool,

    /// 多分散气泡谱
    #[serde(default)]
    pub polydisperse: bool,

    /// 谱离散点数 nb
    #[serde(default = "default_bin_count")]
    pub bin_count: u32,
}

fn default_true() -> bool {
    true
}
fn default_bubble_model() -> BubbleModel {
    BubbleModel::KellerMiksis
}
fn default_bin_count() -> u32 {
    1
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_bubble_model(),
            polytropic: true,
            polydisperse: false,
            bin_count: default_bin_count(),
        }
    }
}

/// 声学源配置，有量纲输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcousticConfig {
    /// 源位置 [m]
    #[serde(default = "default_acoustic_location")]
    pub location_m: f64,

    /// 传播方向
    #[serde(default = "default_acoustic_direction")]
    pub direction: f64,

    /// 压力幅值 [Pa]
    #[serde(default = "default_acoustic_magnitude")]
    pub magnitude_pa: f64,

    /// 脉冲频率 [Hz]
    #[serde(default = "default_acoustic_frequency")]
    pub frequency_hz: f64,

    /// 脉冲波形
    #[serde(default = "default_pulse_shape")]
    pub pulse: PulseShape,

    /// 脉冲个数
    #[serde(default = "default_pulse_count")]
    pub pulse_count: u32,
}

fn default_acoustic_location() -> f64 {
    -5.0e-3
}
fn default_acoustic_direction() -> f64 {
    1.0
}
fn default_acoustic_magnitude() -> f64 {
    0.1e6
}
fn default_acoustic_frequency() -> f64 {
    300.0e3
}
fn default_pulse_shape() -> PulseShape {
    PulseShape::Sine
}
fn default_pulse_count() -> u32 {
    1
}

impl Default for AcousticConfig {
    fn default() -> Self {
        Self {
            location_m: default_acoustic_location(),
            direction: default_acoustic_direction(),
            magnitude_pa: default_acoustic_magnitude(),
            frequency_hz: default_acoustic_frequency(),
            pulse: default_pulse_shape(),
            pulse_count: default_pulse_count(),
        }
    }
}

fn default_acoustic() -> Option<AcousticConfig> {
    Some(AcousticConfig::default())
}

impl AcousticConfig {
    /// 换算为归一化声学源
    ///
    /// 幅值按 p0 归一，脉冲长度为一个周期的波程除以 x0。
    pub fn to_source(
        &self,
        constants: &PhysicalConstants,
        physical_speed: f64,
    ) -> Result<AcousticSource, CaseError> {
        let magnitude = safe_div(self.magnitude_pa, constants.p0)?;
        let length = safe_div(physical_speed, self.frequency_hz)? / constants.x0;
        Ok(AcousticSource {
            location: self.location_m / constants.x0,
            direction: self.direction,
            magnitude,
            pulse: self.pulse,
            pulse_count: self.pulse_count,
            length,
        })
    }
}

// ============================================================================
// 数值格式选择
// ============================================================================

/// Riemann 求解器选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiemannSolver {
    /// HLL
    Hll,
    /// HLLC
    Hllc,
}

impl RiemannSolver {
    /// 外部求解器使用的编码
    pub fn wire_code(self) -> i64 {
        match self {
            Self::Hll => 1,
            Self::Hllc => 2,
        }
    }
}

/// 数值格式选择块
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericsConfig {
    /// 控制方程组选择编码
    #[serde(default = "default_model_eqns")]
    pub model_eqns: i64,

    /// 备选声速公式
    #[serde(default)]
    pub alt_soundspeed: bool,

    /// 流体相数（不含气泡气体槽位）
    #[serde(default = "default_num_fluids")]
    pub num_fluids: u32,

    /// 输运空隙率方程
    #[serde(default = "default_true")]
    pub advect_void_fraction: bool,

    /// 混合物正性限制器
    #[serde(default)]
    pub mixture_positivity_limiter: bool,

    /// 混合物一致性检查
    #[serde(default)]
    pub mixture_error_check: bool,

    /// 时间积分格式编码
    #[serde(default = "default_time_stepper")]
    pub time_stepper: i64,

    /// WENO 重构变量选择
    #[serde(default = "default_weno_vars")]
    pub weno_vars: i64,

    /// WENO 重构阶数
    #[serde(default = "default_weno_order")]
    pub weno_order: u32,

    /// WENO 光滑因子下限
    #[serde(default = "default_weno_eps")]
    pub weno_eps: f64,

    /// 特征分解重构
    #[serde(default)]
    pub characteristic_decomposition: bool,

    /// 映射 WENO
    #[serde(default = "default_true")]
    pub mapped_weno: bool,

    /// 零权重修正
    #[serde(default)]
    pub null_weights: bool,

    /// 单调保持 WENO
    #[serde(default = "default_true")]
    pub mp_weno: bool,

    /// Riemann 求解器
    #[serde(default = "default_riemann_solver")]
    pub riemann_solver: RiemannSolver,

    /// 波速估计选择
    #[serde(default = "default_wave_speeds")]
    pub wave_speeds: i64,

    /// 平均态选择
    #[serde(default = "default_avg_state")]
    pub avg_state: i64,

    /// 交换误差检查
    #[serde(default)]
    pub commute_error_check: bool,

    /// 分裂误差检查
    #[serde(default)]
    pub split_error_check: bool,

    /// x 向起始边界条件编码
    #[serde(default = "default_bc")]
    pub bc_begin: i64,

    /// x 向终止边界条件编码
    #[serde(default = "default_bc")]
    pub bc_end: i64,

    /// y 向起始边界条件编码，2D 算例必填
    #[serde(default)]
    pub bc_y_begin: Option<i64>,

    /// y 向终止边界条件编码，2D 算例必填
    #[serde(default)]
    pub bc_y_end: Option<i64>,
}

fn default_model_eqns() -> i64 {
    2
}
fn default_num_fluids() -> u32 {
    1
}
fn default_time_stepper() -> i64 {
    3
}
fn default_weno_vars() -> i64 {
    2
}
fn default_weno_order() -> u32 {
    5
}
fn default_weno_eps() -> f64 {
    1.0e-16
}
fn default_riemann_solver() -> RiemannSolver {
    RiemannSolver::Hllc
}
fn default_wave_speeds() -> i64 {
    1
}
fn default_avg_state() -> i64 {
    2
}
fn default_bc() -> i64 {
    -8
}

impl Default for NumericsConfig {
    fn default() -> Self {
        Self {
            model_eqns: default_model_eqns(),
            alt_soundspeed: false,
            num_fluids: default_num_fluids(),
            advect_void_fraction: true,
            mixture_positivity_limiter: false,
            mixture_error_check: false,
            time_stepper: default_time_stepper(),
            weno_vars: default_weno_vars(),
            weno_order: default_weno_order(),
            weno_eps: default_weno_eps(),
            characteristic_decomposition: false,
            mapped_weno: true,
            null_weights: false,
            mp_weno: true,
            riemann_solver: default_riemann_solver(),
            wave_speeds: default_wave_speeds(),
            avg_state: default_avg_state(),
            commute_error_check: false,
            split_error_check: false,
            bc_begin: default_bc(),
            bc_end: default_bc(),
            bc_y_begin: None,
            bc_y_end: None,
        }
    }
}

// ============================================================================
// 输出与作业配置
// ============================================================================

/// 数据库输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Silo/HDF5
    Silo,
    /// 原始二进制
    Binary,
}

impl OutputFormat {
    /// 外部求解器使用的编码
    pub fn wire_code(self) -> i64 {
        match self {
            Self::Silo => 1,
            Self::Binary => 2,
        }
    }
}

/// 输出精度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputPrecision {
    /// 单精度
    Single,
    /// 双精度
    Double,
}

impl OutputPrecision {
    /// 外部求解器使用的编码
    pub fn wire_code(self) -> i64 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
        }
    }
}

/// 输出控制块
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputControl {
    /// 数据库格式
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// 输出精度
    #[serde(default = "default_precision")]
    pub precision: OutputPrecision,

    /// 写出原始变量
    #[serde(default = "default_true")]
    pub write_primitive_vars: bool,

    /// 并行 IO
    #[serde(default = "default_true")]
    pub parallel_io: bool,

    /// 探针插值的有限差分阶数
    #[serde(default = "default_fd_order")]
    pub fd_order: i64,

    /// 探针位置（无量纲坐标），为空时不写探针
    #[serde(default = "default_probes")]
    pub probes: Vec<f64>,
}

fn default_format() -> OutputFormat {
    OutputFormat::Silo
}
fn default_precision() -> OutputPrecision {
    OutputPrecision::Double
}
fn default_fd_order() -> i64 {
    1
}
fn default_probes() -> Vec<f64> {
    vec![0.0]
}

impl Default for OutputControl {
    fn default() -> Self {
        Self {
            format: default_format(),
            precision: default_precision(),
            write_primitive_vars: true,
            parallel_io: true,
            fd_order: default_fd_order(),
            probes: default_probes(),
        }
    }
}

/// 作业参数块
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticsConfig {
    /// 算例目录的线上值（外部工具期望带引号的字面量）
    #[serde(default = "default_case_dir")]
    pub case_dir: String,

    /// 写运行时信息
    #[serde(default = "default_true")]
    pub run_time_info: bool,

    /// 节点数
    #[serde(default = "default_one")]
    pub nodes: u32,

    /// 每节点进程数，大于 1 表示并行
    #[serde(default = "default_one")]
    pub tasks_per_node: u32,

    /// 队列名
    #[serde(default = "default_queue")]
    pub queue: String,

    /// 墙钟时限
    #[serde(default = "default_walltime")]
    pub walltime: String,

    /// 通知邮件列表
    #[serde(default)]
    pub mail_list: String,
}

fn default_case_dir() -> String {
    "'.'".to_string()
}
fn default_one() -> u32 {
    1
}
fn default_queue() -> String {
    "normal".to_string()
}
fn default_walltime() -> String {
    "24:00:00".to_string()
}

impl Default for LogisticsConfig {
    fn default() -> Self {
        Self {
            case_dir: default_case_dir(),
            run_time_info: true,
            nodes: default_one(),
            tasks_per_node: default_one(),
            queue: default_queue(),
            walltime: default_walltime(),
            mail_list: String::new(),
        }
    }
}

// ============================================================================
// 顶层算例配置
// ============================================================================

/// 算例文件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseConfig {
    /// 物理常数
    #[serde(default)]
    pub constants: PhysicalConstants,

    /// 网格与时间推进
    #[serde(default)]
    pub grid: GridConfig,

    /// 脉冲时间窗
    #[serde(default)]
    pub pulse: PulseConfig,

    /// patch 序列，声明顺序即叠加优先级
    #[serde(default = "default_patches")]
    pub patches: Vec<PatchConfig>,

    /// 气泡动力学
    #[serde(default)]
    pub bubbles: BubbleConfig,

    /// 声学源，null 表示无外部强迫
    #[serde(default = "default_acoustic")]
    pub acoustic: Option<AcousticConfig>,

    /// 数值格式
    #[serde(default)]
    pub numerics: NumericsConfig,

    /// 输出控制
    #[serde(default)]
    pub output: OutputControl,

    /// 作业参数
    #[serde(default)]
    pub logistics: LogisticsConfig,
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            constants: PhysicalConstants::default(),
            grid: GridConfig::default(),
            pulse: PulseConfig::default(),
            patches: default_patches(),
            bubbles: BubbleConfig::default(),
            acoustic: default_acoustic(),
            numerics: NumericsConfig::default(),
            output: OutputControl::default(),
            logistics: LogisticsConfig::default(),
        }
    }
}

impl CaseConfig {
    /// 从文件加载算例并验证
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CaseError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(CaseError::Io)?;
        let config: CaseConfig =
            serde_json::from_str(&content).map_err(|e| CaseError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存算例到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CaseError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| CaseError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(CaseError::Io)?;
        Ok(())
    }

    /// 验证算例，收集全部错误
    pub fn validate(&self) -> Result<(), CaseError> {
        let mut report = self.constants.validate();

        check_positive(&mut report, "grid.domain_length_m", self.grid.domain_length_m);
        check_positive(&mut report, "grid.physical_speed", self.grid.physical_speed);
        if self.grid.nx == 0 {
            report.add_error(ValidationError::custom("grid.nx: 网格单元数必须为正"));
        }
        if self.grid.n_files == 0 {
            report.add_error(ValidationError::custom("grid.n_files: 输出快照数必须为正"));
        }
        if !self.grid.cfl.is_finite() || self.grid.cfl <= 0.0 || self.grid.cfl >= 1.0 {
            report.add_error(ValidationError::OutOfRange {
                field: "grid.cfl".to_string(),
                value: self.grid.cfl,
                min: 0.0,
                max: 1.0,
            });
        }

        if let Some(transverse) = &self.grid.transverse {
            check_positive(
                &mut report,
                "grid.transverse.domain_length_m",
                transverse.domain_length_m,
            );
            if transverse.ny == 0 {
                report.add_error(ValidationError::custom(
                    "grid.transverse.ny: 横向网格单元数必须为正",
                ));
            }
            if self.numerics.bc_y_begin.is_none() || self.numerics.bc_y_end.is_none() {
                report.add_error(ValidationError::constraint(
                    "已配置横向轴，缺少 bc_y 边界条件编码",
                ));
            }
        } else if self.numerics.bc_y_begin.is_some() || self.numerics.bc_y_end.is_some() {
            report.add_error(ValidationError::constraint(
                "配置了 bc_y 边界条件但缺少横向轴",
            ));
        }

        check_positive(&mut report, "pulse.length_fraction", self.pulse.length_fraction);
        check_range(
            &mut report,
            "pulse.length_fraction",
            self.pulse.length_fraction,
            0.0,
            1.0,
        );
        check_positive(&mut report, "pulse.duration_factor", self.pulse.duration_factor);

        if self.patches.is_empty() {
            report.add_error(ValidationError::constraint("至少需要一个 patch"));
        }
        for (offset, patch) in self.patches.iter().enumerate() {
            let number = offset + 1;
            if let Some(target) = patch.alters {
                if target == 0 {
                    report.add_error(ValidationError::custom(format!(
                        "patch {number}: alters 编号从 1 开始"
                    )));
                } else if target as usize >= number {
                    report.add_error(ValidationError::constraint(format!(
                        "patch {number} 引用 alters = {target}，只能覆盖更早的编号"
                    )));
                }
            }
            check_range(
                &mut report,
                &format!("patches[{offset}].void_fraction"),
                patch.void_fraction,
                0.0,
                1.0,
            );
            check_positive(
                &mut report,
                &format!("patches[{offset}].liquid_density"),
                patch.liquid_density,
            );
        }

        if !matches!(self.numerics.weno_order, 1 | 3 | 5) {
            report.add_error(ValidationError::custom(format!(
                "numerics.weno_order: {} 不是合法阶数 (1/3/5)",
                self.numerics.weno_order
            )));
        }
        if self.numerics.num_fluids == 0 {
            report.add_error(ValidationError::custom("numerics.num_fluids: 相数必须为正"));
        }
        check_positive(&mut report, "numerics.weno_eps", self.numerics.weno_eps);

        if self.bubbles.enabled {
            if self.bubbles.bin_count == 0 {
                report.add_error(ValidationError::custom("bubbles.bin_count: 谱点数必须为正"));
            }
            if !self.bubbles.polydisperse && self.bubbles.bin_count != 1 {
                report.add_error(ValidationError::constraint(
                    "单分散谱的 bubbles.bin_count 必须为 1",
                ));
            }
        }

        if let Some(acoustic) = &self.acoustic {
            check_positive(&mut report, "acoustic.magnitude_pa", acoustic.magnitude_pa);
            check_positive(&mut report, "acoustic.frequency_hz", acoustic.frequency_hz);
            if acoustic.pulse_count == 0 {
                report.add_error(ValidationError::custom("acoustic.pulse_count: 脉冲个数必须为正"));
            }
        }

        for (i, probe) in self.output.probes.iter().enumerate() {
            if !probe.is_finite() {
                report.add_error(ValidationError::NonFinite {
                    field: format!("output.probes[{i}]"),
                    value: *probe,
                });
            }
        }

        report.into_result().map_err(CaseError::Validation)
    }

    /// 执行完整派生链，装配算例描述符
    pub fn build(&self) -> Result<CaseDescriptor, CaseError> {
        self.validate()?;

        let scales = ReferenceScales::derive(&self.constants)?;
        let groups = DimensionlessGroups::derive(&self.constants, &scales)?;
        debug!(c0 = scales.c0, ca = groups.cavitation, we = groups.weber, "归一化完成");

        let t_final = pulse_final_time(
            self.grid.domain_length_m,
            self.pulse.length_fraction,
            self.grid.physical_speed,
            self.pulse.duration_factor,
            scales.c0,
            self.constants.x0,
        )?;
        let input = DiscretizationInput {
            domain_length: self.grid.domain_length_m / self.constants.x0,
            nx: self.grid.nx,
            cfl: self.grid.cfl,
            physical_speed: self.grid.physical_speed,
            t_final,
            n_files: self.grid.n_files,
            transverse: self.grid.transverse.as_ref().map(|t| TransverseAxis {
                length: t.domain_length_m / self.constants.x0,
                ny: t.ny,
            }),
        };
        let grid = input.plan(scales.c0)?;
        debug!(dx = grid.dx, dt = grid.dt, nt = grid.n_steps, "离散化规划完成");

        let mut patches = PatchSet::new();
        for patch_config in &self.patches {
            patches.push(patch_config.to_patch(&self.constants, self.bubbles.enabled)?)?;
        }

        let mut fluids = vec![FluidPropertyRecord::stiffened_liquid(
            self.constants.n_tait,
            self.constants.b_tait_normalized()?,
        )?];
        if self.bubbles.enabled {
            // 末位槽位保留给气泡内气体
            fluids.push(FluidPropertyRecord::ideal_gas(self.constants.gamma_gas)?);
        }

        let mut builder = CaseBuilder::new()
            .constants(self.constants.clone())
            .scales(scales)
            .groups(groups)
            .grid(grid)
            .patches(patches)
            .fluids(fluids)
            .numerics(self.numerics.clone())
            .output(self.output.clone())
            .logistics(self.logistics.clone());

        if self.bubbles.enabled {
            builder = builder.bubbles(BubbleParameters {
                model: self.bubbles.model,
                polytropic: self.bubbles.polytropic,
                polydisperse: self.bubbles.polydisperse,
                r0_ref: self.constants.r0_ref,
                bin_count: self.bubbles.bin_count,
            });
        }
        if let Some(acoustic) = &self.acoustic {
            builder = builder.acoustic(acoustic.to_source(&self.constants, self.grid.physical_speed)?);
        }

        builder.build()
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::CaseValue;
    use mc_foundation::float::approx_eq_rel;

    fn real(descriptor: &CaseDescriptor, key: &str) -> f64 {
        match descriptor.get(key) {
            Some(CaseValue::Real(v)) => *v,
            other => panic!("{key} 不是实数: {other:?}"),
        }
    }

    #[test]
    fn test_default_config_valid() {
        assert!(CaseConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default_case() {
        let config: CaseConfig = serde_json::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.nx, 100);
        assert_eq!(config.patches.len(), 2);
        assert!(config.acoustic.is_some());
    }

    #[test]
    fn test_invalid_cfl_rejected() {
        let mut config = CaseConfig::default();
        config.grid.cfl = 1.0;
        assert!(config.validate().is_err());
        config.grid.cfl = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_forward_alter_reference_rejected() {
        let mut config = CaseConfig::default();
        config.patches[1].alters = Some(5);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("5"));
    }

    #[test]
    fn test_validation_collects_multiple_errors() {
        let mut config = CaseConfig::default();
        config.grid.cfl = 2.0;
        config.grid.nx = 0;
        config.constants.rho0 = -1.0;
        match config.validate() {
            Err(CaseError::Validation(report)) => assert!(report.error_count() >= 3),
            other => panic!("期望收集式验证错误: {other:?}"),
        }
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = CaseConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: CaseConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.grid.nx, config.grid.nx);
        assert_eq!(parsed.patches.len(), config.patches.len());
    }

    #[test]
    fn test_build_default_case_regression() {
        let descriptor = CaseConfig::default().build().unwrap();

        // L = 20e-3 / 1e-5 = 2000，域以原点为中心
        assert!(approx_eq_rel(real(&descriptor, "x_domain%beg"), -1000.0, 1e-9));
        assert!(approx_eq_rel(real(&descriptor, "x_domain%end"), 1000.0, 1e-9));
        // dt = 0.1 * 20 / (1475/10.066) ≈ 0.01365
        assert!(approx_eq_rel(real(&descriptor, "dt"), 0.01365, 1e-2));
        // patch 长度: 背景 2000，屏 500
        assert!(approx_eq_rel(
            real(&descriptor, "patch_icpp(1)%length_x"),
            2000.0,
            1e-9
        ));
        assert!(approx_eq_rel(
            real(&descriptor, "patch_icpp(2)%length_x"),
            500.0,
            1e-9
        ));
        // 相似组
        assert!(approx_eq_rel(real(&descriptor, "Ca"), 0.9769, 1e-3));
        assert!(approx_eq_rel(real(&descriptor, "Web"), 13.93, 1e-2));
        assert!(approx_eq_rel(real(&descriptor, "Re_inv"), 9.954e-3, 1e-2));
        // 声学源: loc = -5e-3/1e-5 = -500，length = (1475/3e5)/1e-5 ≈ 491.7
        assert!(approx_eq_rel(real(&descriptor, "Mono(1)%loc(1)"), -500.0, 1e-9));
        assert!(approx_eq_rel(real(&descriptor, "Mono(1)%length"), 491.67, 1e-3));
        // Tait 闭合
        assert!(approx_eq_rel(
            real(&descriptor, "fluid_pp(1)%gamma"),
            1.0 / 6.1,
            1e-9
        ));
        assert!(approx_eq_rel(real(&descriptor, "fluid_pp(2)%gamma"), 2.5, 1e-9));
    }

    #[test]
    fn test_output_cadence_identity_in_descriptor() {
        let descriptor = CaseConfig::default().build().unwrap();
        let nt = match descriptor.get("t_step_stop") {
            Some(CaseValue::Int(v)) => *v,
            other => panic!("t_step_stop: {other:?}"),
        };
        let nout = match descriptor.get("t_step_save") {
            Some(CaseValue::Int(v)) => *v,
            other => panic!("t_step_save: {other:?}"),
        };
        assert_eq!(nt % nout, 0);
        assert_eq!(nt / nout, 20);
    }

    #[test]
    fn test_bubbles_disabled_case() {
        let mut config = CaseConfig::default();
        config.bubbles.enabled = false;
        let descriptor = config.build().unwrap();
        assert_eq!(descriptor.get("bubbles"), Some(&CaseValue::Flag(false)));
        assert!(descriptor.get("bubble_model").is_none());
        // 无气泡时不写气体槽位，也不写 patch 的 r0/v0
        assert!(descriptor.get("fluid_pp(2)%gamma").is_none());
        assert!(descriptor.get("patch_icpp(1)%r0").is_none());
    }

    #[test]
    fn test_no_acoustic_source() {
        let mut config = CaseConfig::default();
        config.acoustic = None;
        let descriptor = config.build().unwrap();
        assert!(descriptor.get("Monopole").is_none());
        assert!(descriptor.get("Mono(1)%mag").is_none());
    }
}
