// crates/mc_case/src/descriptor.rs

//! 算例描述符装配
//!
//! `CaseBuilder` 把归一化常数、离散化参数、patch 序列、流体物性、
//! 气泡与声学块合并为一个不可变的 `CaseDescriptor`。键名目录即与
//! 外部求解器的线上契约，键重复在装配期立即失败。
//!
//! 描述符装配两次应产出逐字段一致的结果，装配过程不修改任何输入。

use tracing::info;

use crate::acoustic::AcousticSource;
use crate::config::{LogisticsConfig, NumericsConfig, OutputControl};
use crate::dictionary::{CaseDictionary, CaseValue};
use crate::discretization::GridSpec;
use crate::error::CaseError;
use crate::fluid::{BubbleParameters, FluidPropertyRecord};
use crate::patch::{Patch, PatchSet};
use crate::physics::{DimensionlessGroups, PhysicalConstants, ReferenceScales};

// ============================================================================
// 描述符
// ============================================================================

/// 装配完成的算例描述符，只读
#[derive(Debug, Clone, PartialEq)]
pub struct CaseDescriptor {
    dict: CaseDictionary,
}

impl CaseDescriptor {
    /// 按键取值
    pub fn get(&self, key: &str) -> Option<&CaseValue> {
        self.dict.get(key)
    }

    /// 字段数
    pub fn len(&self) -> usize {
        self.dict.len()
    }

    /// 描述符是否为空
    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// 按装配顺序迭代
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CaseValue)> {
        self.dict.iter()
    }

    /// 序列化为保持键序的 JSON 文本
    pub fn to_json_string(&self) -> Result<String, CaseError> {
        serde_json::to_string_pretty(&self.dict).map_err(|e| CaseError::Parse(e.to_string()))
    }
}

// ============================================================================
// 装配器
// ============================================================================

/// 算例描述符装配器
///
/// 各部件就位后一次性 `build`；缺少必需部件时报 `Missing`。
#[derive(Debug, Default)]
pub struct CaseBuilder {
    constants: Option<PhysicalConstants>,
    scales: Option<ReferenceScales>,
    groups: Option<DimensionlessGroups>,
    grid: Option<GridSpec>,
    patches: Option<PatchSet>,
    fluids: Vec<FluidPropertyRecord>,
    bubbles: Option<BubbleParameters>,
    acoustic: Option<AcousticSource>,
    numerics: Option<NumericsConfig>,
    output: Option<OutputControl>,
    logistics: Option<LogisticsConfig>,
}

impl CaseBuilder {
    /// 创建空装配器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置物理常数
    pub fn constants(mut self, constants: PhysicalConstants) -> Self {
        self.constants = Some(constants);
        self
    }

    /// 设置参考尺度
    pub fn scales(mut self, scales: ReferenceScales) -> Self {
        self.scales = Some(scales);
        self
    }

    /// 设置无量纲相似组
    pub fn groups(mut self, groups: DimensionlessGroups) -> Self {
        self.groups = Some(groups);
        self
    }

    /// 设置网格规格
    pub fn grid(mut self, grid: GridSpec) -> Self {
        self.grid = Some(grid);
        self
    }

    /// 设置 patch 序列
    pub fn patches(mut self, patches: PatchSet) -> Self {
        self.patches = Some(patches);
        self
    }

    /// 设置流体物性记录，末位约定为气泡气体
    pub fn fluids(mut self, fluids: Vec<FluidPropertyRecord>) -> Self {
        self.fluids = fluids;
        self
    }

    /// 启用气泡动力学
    pub fn bubbles(mut self, bubbles: BubbleParameters) -> Self {
        self.bubbles = Some(bubbles);
        self
    }

    /// 附加声学源
    pub fn acoustic(mut self, acoustic: AcousticSource) -> Self {
        self.acoustic = Some(acoustic);
        self
    }

    /// 设置数值格式选择
    pub fn numerics(mut self, numerics: NumericsConfig) -> Self {
        self.numerics = Some(numerics);
        self
    }

    /// 设置输出控制
    pub fn output(mut self, output: OutputControl) -> Self {
        self.output = Some(output);
        self
    }

    /// 设置作业参数
    pub fn logistics(mut self, logistics: LogisticsConfig) -> Self {
        self.logistics = Some(logistics);
        self
    }

    /// 装配描述符
    pub fn build(self) -> Result<CaseDescriptor, CaseError> {
        let constants = self
            .constants
            .ok_or_else(|| CaseError::Missing("物理常数".to_string()))?;
        let groups = self
            .groups
            .ok_or_else(|| CaseError::Missing("无量纲相似组".to_string()))?;
        let grid = self
            .grid
            .ok_or_else(|| CaseError::Missing("网格规格".to_string()))?;
        let patches = self
            .patches
            .ok_or_else(|| CaseError::Missing("patch 序列".to_string()))?;
        let numerics = self
            .numerics
            .ok_or_else(|| CaseError::Missing("数值格式".to_string()))?;
        let output = self
            .output
            .ok_or_else(|| CaseError::Missing("输出控制".to_string()))?;
        let logistics = self
            .logistics
            .ok_or_else(|| CaseError::Missing("作业参数".to_string()))?;
        // 参考尺度目前只参与上游归一化，装配本身不写入，仍要求就位
        let _scales = self
            .scales
            .ok_or_else(|| CaseError::Missing("参考尺度".to_string()))?;

        if patches.is_empty() {
            return Err(CaseError::Missing("至少一个 patch".to_string()));
        }
        if self.fluids.is_empty() {
            return Err(CaseError::Missing("流体物性记录".to_string()));
        }
        if let Some(bubbles) = &self.bubbles {
            bubbles.validate()?;
        }
        if let Some(acoustic) = &self.acoustic {
            acoustic.validate()?;
        }

        let mut dict = CaseDictionary::new();

        emit_logistics(&mut dict, &logistics)?;
        emit_domain(&mut dict, &grid)?;
        emit_algorithm(&mut dict, &numerics, patches.len())?;
        emit_output(&mut dict, &output)?;
        emit_patches(&mut dict, &patches)?;
        emit_fluids(&mut dict, &self.fluids)?;

        dict.insert("pref", constants.p0)?;
        dict.insert("rhoref", constants.rho0)?;

        emit_bubbles(&mut dict, self.bubbles.as_ref(), &groups)?;
        if let Some(acoustic) = &self.acoustic {
            emit_acoustic(&mut dict, acoustic)?;
        }

        info!(
            patches = patches.len(),
            fluids = self.fluids.len(),
            keys = dict.len(),
            "算例描述符装配完成"
        );

        Ok(CaseDescriptor { dict })
    }
}

// ============================================================================
// 分块写入
// ============================================================================

fn emit_logistics(dict: &mut CaseDictionary, logistics: &LogisticsConfig) -> Result<(), CaseError> {
    dict.insert("case_dir", logistics.case_dir.as_str())?;
    dict.insert("run_time_info", logistics.run_time_info)?;
    dict.insert("nodes", logistics.nodes)?;
    dict.insert("ppn", logistics.tasks_per_node)?;
    dict.insert("queue", logistics.queue.as_str())?;
    dict.insert("walltime", logistics.walltime.as_str())?;
    dict.insert("mail_list", logistics.mail_list.as_str())?;
    Ok(())
}

fn emit_domain(dict: &mut CaseDictionary, grid: &GridSpec) -> Result<(), CaseError> {
    dict.insert("x_domain%beg", grid.domain_begin())?;
    dict.insert("x_domain%end", grid.domain_end())?;
    if let Some(transverse) = &grid.transverse {
        dict.insert("y_domain%beg", transverse.domain_begin())?;
        dict.insert("y_domain%end", transverse.domain_end())?;
    }
    dict.insert("stretch_x", false)?;
    dict.insert("cyl_coord", false)?;
    dict.insert("m", grid.nx)?;
    dict.insert("n", grid.transverse.map_or(0, |t| i64::from(t.ny)))?;
    dict.insert("p", 0i64)?;
    dict.insert("dt", grid.dt)?;
    dict.insert("t_step_start", 0i64)?;
    dict.insert("t_step_stop", grid.n_steps)?;
    dict.insert("t_step_save", grid.n_out)?;
    Ok(())
}

fn emit_algorithm(
    dict: &mut CaseDictionary,
    numerics: &NumericsConfig,
    patch_count: usize,
) -> Result<(), CaseError> {
    dict.insert("num_patches", patch_count as u64)?;
    dict.insert("model_eqns", numerics.model_eqns)?;
    dict.insert("alt_soundspeed", numerics.alt_soundspeed)?;
    dict.insert("num_fluids", numerics.num_fluids)?;
    dict.insert("adv_alphan", numerics.advect_void_fraction)?;
    dict.insert("mpp_lim", numerics.mixture_positivity_limiter)?;
    dict.insert("mixture_err", numerics.mixture_error_check)?;
    dict.insert("time_stepper", numerics.time_stepper)?;
    dict.insert("weno_vars", numerics.weno_vars)?;
    dict.insert("weno_order", numerics.weno_order)?;
    dict.insert("weno_eps", numerics.weno_eps)?;
    dict.insert("char_decomp", numerics.characteristic_decomposition)?;
    dict.insert("mapped_weno", numerics.mapped_weno)?;
    dict.insert("null_weights", numerics.null_weights)?;
    dict.insert("mp_weno", numerics.mp_weno)?;
    dict.insert("riemann_solver", numerics.riemann_solver.wire_code())?;
    dict.insert("wave_speeds", numerics.wave_speeds)?;
    dict.insert("avg_state", numerics.avg_state)?;
    dict.insert("commute_err", numerics.commute_error_check)?;
    dict.insert("split_err", numerics.split_error_check)?;
    dict.insert("bc_x%beg", numerics.bc_begin)?;
    dict.insert("bc_x%end", numerics.bc_end)?;
    if let (Some(begin), Some(end)) = (numerics.bc_y_begin, numerics.bc_y_end) {
        dict.insert("bc_y%beg", begin)?;
        dict.insert("bc_y%end", end)?;
    }
    Ok(())
}

fn emit_output(dict: &mut CaseDictionary, output: &OutputControl) -> Result<(), CaseError> {
    dict.insert("format", output.format.wire_code())?;
    dict.insert("precision", output.precision.wire_code())?;
    dict.insert("prim_vars_wrt", output.write_primitive_vars)?;
    dict.insert("parallel_io", output.parallel_io)?;
    dict.insert("fd_order", output.fd_order)?;
    dict.insert("probe_wrt", !output.probes.is_empty())?;
    dict.insert("num_probes", output.probes.len() as u64)?;
    for (i, x) in output.probes.iter().enumerate() {
        dict.insert(format!("probe({})%x", i + 1), *x)?;
    }
    Ok(())
}

const AXES: [char; 3] = ['x', 'y', 'z'];

fn emit_patches(dict: &mut CaseDictionary, patches: &PatchSet) -> Result<(), CaseError> {
    for (index, patch) in patches.iter() {
        emit_patch(dict, index.get(), patch)?;
    }
    Ok(())
}

fn emit_patch(dict: &mut CaseDictionary, i: u32, patch: &Patch) -> Result<(), CaseError> {
    let prefix = format!("patch_icpp({i})");
    dict.insert(format!("{prefix}%geometry"), patch.geometry.wire_code())?;
    if let Some(target) = patch.alters {
        dict.insert(format!("{prefix}%alter_patch({target})"), true)?;
    }
    for (axis, value) in AXES.iter().zip(&patch.centroid) {
        dict.insert(format!("{prefix}%{axis}_centroid"), *value)?;
    }
    if patch.geometry.is_radial() {
        dict.insert(format!("{prefix}%radius"), patch.extent[0])?;
    } else {
        for (axis, value) in AXES.iter().zip(&patch.extent) {
            dict.insert(format!("{prefix}%length_{axis}"), *value)?;
        }
    }
    for (k, value) in patch.velocity.iter().enumerate() {
        dict.insert(format!("{prefix}%vel({})", k + 1), *value)?;
    }
    dict.insert(format!("{prefix}%pres"), patch.pressure)?;
    for (k, value) in patch.partial_density.iter().enumerate() {
        dict.insert(format!("{prefix}%alpha_rho({})", k + 1), *value)?;
    }
    for (k, value) in patch.volume_fraction.iter().enumerate() {
        dict.insert(format!("{prefix}%alpha({})", k + 1), *value)?;
    }
    if let Some(r0) = patch.bubble_radius {
        dict.insert(format!("{prefix}%r0"), r0)?;
    }
    if let Some(v0) = patch.bubble_velocity {
        dict.insert(format!("{prefix}%v0"), v0)?;
    }
    Ok(())
}

fn emit_fluids(
    dict: &mut CaseDictionary,
    fluids: &[FluidPropertyRecord],
) -> Result<(), CaseError> {
    for (k, record) in fluids.iter().enumerate() {
        let prefix = format!("fluid_pp({})", k + 1);
        dict.insert(format!("{prefix}%gamma"), record.gamma)?;
        dict.insert(format!("{prefix}%pi_inf"), record.pi_inf)?;
        if let Some(g) = record.shear_modulus {
            dict.insert(format!("{prefix}%G"), g)?;
        }
    }
    Ok(())
}

fn emit_bubbles(
    dict: &mut CaseDictionary,
    bubbles: Option<&BubbleParameters>,
    groups: &DimensionlessGroups,
) -> Result<(), CaseError> {
    let Some(bubbles) = bubbles else {
        dict.insert("bubbles", false)?;
        return Ok(());
    };
    dict.insert("bubbles", true)?;
    dict.insert("bubble_model", bubbles.model.wire_code())?;
    dict.insert("polytropic", bubbles.polytropic)?;
    dict.insert("polydisperse", bubbles.polydisperse)?;
    dict.insert("R0ref", bubbles.r0_ref)?;
    dict.insert("nb", bubbles.bin_count)?;
    dict.insert("Ca", groups.cavitation)?;
    dict.insert("Web", groups.weber)?;
    dict.insert("Re_inv", groups.reynolds_inv)?;
    Ok(())
}

fn emit_acoustic(dict: &mut CaseDictionary, acoustic: &AcousticSource) -> Result<(), CaseError> {
    dict.insert("Monopole", true)?;
    dict.insert("num_mono", 1i64)?;
    dict.insert("Mono(1)%loc(1)", acoustic.location)?;
    dict.insert("Mono(1)%npulse", acoustic.pulse_count)?;
    dict.insert("Mono(1)%dir", acoustic.direction)?;
    dict.insert("Mono(1)%pulse", acoustic.pulse.wire_code())?;
    dict.insert("Mono(1)%mag", acoustic.magnitude)?;
    dict.insert("Mono(1)%length", acoustic.length)?;
    Ok(())
}

// ============================================================================
// 测试
// ============================================================================
