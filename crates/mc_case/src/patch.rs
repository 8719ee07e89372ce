// crates/mc_case/src/patch.rs

//! 有序 patch 组合
//!
//! 初始条件由一串几何区域（patch）逐层叠加描述。patch 从 1 起编号，
//! 声明顺序即叠加优先级，后声明者在重叠区域覆盖先声明者。
//! 组合器本身不做几何栅格化，只记录每个 patch 是否覆盖某个更早的
//! patch；栅格化由外部求解器在运行期完成。
//!
//! 唯一的硬不变量: `alters` 引用必须指向序列中更早的编号，
//! 引用自身、之后或不存在的编号是配置错误。

use mc_foundation::index::PatchIndex;
use serde::{Deserialize, Serialize};

use crate::error::CaseError;

// ============================================================================
// 几何类型
// ============================================================================

/// patch 几何类型
///
/// 判别值与外部求解器的几何编码一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchGeometry {
    /// 一维线段
    LineSegment,
    /// 二维圆
    Circle,
    /// 二维矩形
    Rectangle,
    /// 三维球
    Sphere,
    /// 三维长方体
    Cuboid,
}

impl PatchGeometry {
    /// 外部求解器使用的几何编码
    pub fn wire_code(self) -> i64 {
        match self {
            Self::LineSegment => 1,
            Self::Circle => 2,
            Self::Rectangle => 3,
            Self::Sphere => 8,
            Self::Cuboid => 9,
        }
    }

    /// 几何所在的空间维数
    pub fn dimensions(self) -> usize {
        match self {
            Self::LineSegment => 1,
            Self::Circle | Self::Rectangle => 2,
            Self::Sphere | Self::Cuboid => 3,
        }
    }

    /// 半径型几何（圆/球）只携带一个尺度分量
    pub fn is_radial(self) -> bool {
        matches!(self, Self::Circle | Self::Sphere)
    }
}

// ============================================================================
// patch 定义
// ============================================================================

/// 单个 patch: 几何区域加原始场值，均为归一化单位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// 几何类型
    pub geometry: PatchGeometry,
    /// 形心坐标，每个坐标轴一个分量
    pub centroid: Vec<f64>,
    /// 尺度: 方向长度（line/rectangle/cuboid）或单一半径（circle/sphere）
    pub extent: Vec<f64>,
    /// 各方向速度分量
    pub velocity: Vec<f64>,
    /// 压力
    pub pressure: f64,
    /// 各相分密度 alpha_rho(i)
    pub partial_density: Vec<f64>,
    /// 各相体积分数 alpha(i)
    pub volume_fraction: Vec<f64>,
    /// 无量纲初始气泡半径 r0（启用气泡时）
    #[serde(default)]
    pub bubble_radius: Option<f64>,
    /// 无量纲初始气泡壁速度 v0（启用气泡时）
    #[serde(default)]
    pub bubble_velocity: Option<f64>,
    /// 覆盖的既有 patch 编号；None 表示基底区域
    #[serde(default)]
    pub alters: Option<PatchIndex>,
}

impl Patch {
    /// 校验字段与几何维数的一致性
    pub fn validate(&self, label: &str) -> Result<(), CaseError> {
        let dims = self.geometry.dimensions();
        if self.centroid.len() != dims {
            return Err(CaseError::invalid_value(
                format!("{label}%centroid"),
                self.centroid.len(),
                format!("形心分量数须等于几何维数 {dims}"),
            ));
        }
        let expected_extent = if self.geometry.is_radial() { 1 } else { dims };
        if self.extent.len() != expected_extent {
            return Err(CaseError::invalid_value(
                format!("{label}%extent"),
                self.extent.len(),
                format!("尺度分量数须为 {expected_extent}"),
            ));
        }
        if self.velocity.len() != dims {
            return Err(CaseError::invalid_value(
                format!("{label}%vel"),
                self.velocity.len(),
                format!("速度分量数须等于几何维数 {dims}"),
            ));
        }
        if self.partial_density.len() != self.volume_fraction.len() {
            return Err(CaseError::invalid_value(
                format!("{label}%alpha"),
                self.volume_fraction.len(),
                "分密度与体积分数的相数不一致",
            ));
        }
        for (name, values) in [
            ("centroid", &self.centroid),
            ("extent", &self.extent),
            ("vel", &self.velocity),
            ("alpha_rho", &self.partial_density),
            ("alpha", &self.volume_fraction),
        ] {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(CaseError::invalid_value(
                    format!("{label}%{name}"),
                    "NaN/Inf",
                    "场值必须有限",
                ));
            }
        }
        if !self.pressure.is_finite() {
            return Err(CaseError::invalid_value(
                format!("{label}%pres"),
                self.pressure,
                "压力必须有限",
            ));
        }
        for e in &self.extent {
            if *e <= 0.0 {
                return Err(CaseError::invalid_value(
                    format!("{label}%extent"),
                    *e,
                    "尺度必须为正",
                ));
            }
        }
        for a in &self.volume_fraction {
            if *a < 0.0 || *a > 1.0 {
                return Err(CaseError::invalid_value(
                    format!("{label}%alpha"),
                    *a,
                    "体积分数必须位于 [0, 1]",
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// 有序 patch 序列
// ============================================================================

/// 有序 patch 序列
///
/// 编号顺序 == 声明顺序 == 叠加优先级。追加时即校验 `alters` 引用。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatchSet {
    patches: Vec<Patch>,
}

impl PatchSet {
    /// 创建空序列
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加 patch，返回其获得的编号
    ///
    /// `alters` 引用之后或不存在的编号时拒绝。
    pub fn push(&mut self, patch: Patch) -> Result<PatchIndex, CaseError> {
        let next = PatchIndex::from_offset(self.patches.len()).ok_or_else(|| {
            CaseError::invalid_value("num_patches", self.patches.len(), "patch 数量超出编号范围")
        })?;
        let label = format!("patch_icpp({next})");
        patch.validate(&label)?;

        if let Some(target) = patch.alters {
            if target >= next {
                return Err(CaseError::invalid_value(
                    format!("{label}%alter_patch({target})"),
                    target,
                    format!("只能覆盖更早的 patch 编号（当前已定义 {} 个）", self.patches.len()),
                ));
            }
        }

        self.patches.push(patch);
        Ok(next)
    }

    /// patch 数量
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// 序列是否为空
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// 按编号取 patch
    pub fn get(&self, index: PatchIndex) -> Option<&Patch> {
        self.patches.get(index.to_offset())
    }

    /// 按声明顺序迭代 (编号, patch)
    pub fn iter(&self) -> impl Iterator<Item = (PatchIndex, &Patch)> {
        self.patches.iter().enumerate().map(|(offset, patch)| {
            // offset 来自既有序列，push 已保证可编号
            let index = PatchIndex::from_offset(offset).unwrap_or_else(PatchIndex::first);
            (index, patch)
        })
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line_patch(length: f64, alters: Option<PatchIndex>) -> Patch {
        Patch {
            geometry: PatchGeometry::LineSegment,
            centroid: vec![0.0],
            extent: vec![length],
            velocity: vec![0.0],
            pressure: 1.0,
            partial_density: vec![1.0],
            volume_fraction: vec![1.0e-12],
            bubble_radius: Some(1.0),
            bubble_velocity: Some(0.0),
            alters,
        }
    }

    #[test]
    fn test_declaration_order_preserved() {
        let mut set = PatchSet::new();
        let a = set.push(line_patch(2000.0, None)).unwrap();
        let b = set
            .push(line_patch(500.0, Some(PatchIndex::first())))
            .unwrap();
        let c = set
            .push(line_patch(100.0, Some(PatchIndex::first())))
            .unwrap();

        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_eq!(c.get(), 3);

        let order: Vec<u32> = set.iter().map(|(idx, _)| idx.get()).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_alter_earlier_accepted() {
        let mut set = PatchSet::new();
        set.push(line_patch(2000.0, None)).unwrap();
        let result = set.push(line_patch(500.0, Some(PatchIndex::first())));
        assert!(result.is_ok());
    }

    #[test]
    fn test_alter_self_rejected() {
        let mut set = PatchSet::new();
        set.push(line_patch(2000.0, None)).unwrap();
        // 第二个 patch 引用编号 2，即它自己
        let target = PatchIndex::new(2).unwrap();
        assert!(set.push(line_patch(500.0, Some(target))).is_err());
    }

    #[test]
    fn test_alter_nonexistent_rejected() {
        let mut set = PatchSet::new();
        set.push(line_patch(2000.0, None)).unwrap();
        // 只定义了 2 个 patch 时引用编号 5
        let target = PatchIndex::new(5).unwrap();
        let result = set.push(line_patch(500.0, Some(target)));
        assert!(result.is_err());
        // 序列未被破坏
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut set = PatchSet::new();
        let mut patch = line_patch(2000.0, None);
        patch.centroid = vec![0.0, 0.0];
        assert!(set.push(patch).is_err());
    }

    #[test]
    fn test_volume_fraction_bounds() {
        let mut set = PatchSet::new();
        let mut patch = line_patch(2000.0, None);
        patch.volume_fraction = vec![1.5];
        assert!(set.push(patch).is_err());
    }

    #[test]
    fn test_radial_geometry_extent() {
        let patch = Patch {
            geometry: PatchGeometry::Sphere,
            centroid: vec![0.0, 0.0, 0.0],
            extent: vec![1.0],
            velocity: vec![0.0, 0.0, 0.0],
            pressure: 1.0,
            partial_density: vec![1.0],
            volume_fraction: vec![0.0],
            bubble_radius: None,
            bubble_velocity: None,
            alters: None,
        };
        assert!(patch.validate("patch_icpp(1)").is_ok());
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(PatchGeometry::LineSegment.wire_code(), 1);
        assert_eq!(PatchGeometry::Sphere.wire_code(), 8);
        assert_eq!(PatchGeometry::Cuboid.wire_code(), 9);
    }
}
