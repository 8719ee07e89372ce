// crates/mc_foundation/src/index.rs

//! 强类型槽位索引系统
//!
//! 使用泛型 `SlotId<T>` 实现类型安全的 1 起始槽位编号。
//! 外部求解器的 `patch_icpp(i)` 和 `fluid_pp(i)` 记录均从 1 开始编号，
//! 因此这里不使用 0 起始的 usize，而是用 NonZero 表示合法槽位。
//!
//! # 设计目标
//!
//! 1. **类型安全**: 编译期区分 patch 槽位与 fluid 槽位
//! 2. **零开销**: 与 u32 相同的内存布局（niche 优化下 Option 亦然）
//! 3. **1 起始**: 0 不是合法槽位，解析时直接拒绝
//!
//! # 示例
//!
//! ```
//! use mc_foundation::index::{PatchIndex, FluidIndex};
//!
//! let background = PatchIndex::new(1).unwrap();
//! let screen = background.next();
//! assert_eq!(screen.get(), 2);
//! assert!(PatchIndex::new(0).is_none());
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::num::NonZeroU32;

// ============================================================================
// 标记类型 (Phantom Types)
// ============================================================================

/// patch 槽位标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchTag;

/// fluid 槽位标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FluidTag;

// ============================================================================
// 泛型槽位索引
// ============================================================================

/// 1 起始的泛型槽位索引
///
/// 使用 Phantom Type `T` 区分不同类型的槽位，避免误用。
///
/// # 内存布局
///
/// 内部为 `NonZeroU32`，`Option<SlotId<T>>` 与 u32 等宽。
#[repr(transparent)]
pub struct SlotId<T> {
    slot: NonZeroU32,
    _marker: PhantomData<fn() -> T>,
}

// 手动实现 Copy 和 Clone，避免对 T 施加约束
impl<T> Copy for SlotId<T> {}

impl<T> Clone for SlotId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> SlotId<T> {
    /// 创建槽位索引，0 返回 None
    #[inline]
    pub fn new(slot: u32) -> Option<Self> {
        NonZeroU32::new(slot).map(|slot| Self {
            slot,
            _marker: PhantomData,
        })
    }

    /// 第一个槽位（编号 1）
    #[inline]
    pub fn first() -> Self {
        Self {
            slot: NonZeroU32::MIN,
            _marker: PhantomData,
        }
    }

    /// 下一个槽位
    #[inline]
    pub fn next(self) -> Self {
        Self {
            slot: self.slot.saturating_add(1),
            _marker: PhantomData,
        }
    }

    /// 获取槽位编号（1 起始）
    #[inline]
    pub fn get(self) -> u32 {
        self.slot.get()
    }

    /// 转换为序列下标（0 起始）
    #[inline]
    pub fn to_offset(self) -> usize {
        (self.slot.get() - 1) as usize
    }

    /// 从序列下标（0 起始）创建
    #[inline]
    pub fn from_offset(offset: usize) -> Option<Self> {
        u32::try_from(offset)
            .ok()
            .and_then(|i| Self::new(i + 1))
    }
}

impl<T> PartialEq for SlotId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl<T> Eq for SlotId<T> {}

impl<T> PartialOrd for SlotId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for SlotId<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.slot.cmp(&other.slot)
    }
}

impl<T> Hash for SlotId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
    }
}

impl<T> fmt::Debug for SlotId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.slot)
    }
}

// Display 只输出编号本身，键名格式化由描述符装配层负责
impl<T> fmt::Display for SlotId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slot)
    }
}

impl<T> Serialize for SlotId<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.slot.get())
    }
}

impl<'de, T> Deserialize<'de> for SlotId<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u32::deserialize(deserializer)?;
        Self::new(raw).ok_or_else(|| D::Error::custom("槽位编号必须从 1 开始"))
    }
}

/// 槽位解析错误
#[derive(Debug, Clone, thiserror::Error)]
#[error("无效的槽位编号: {0}, 槽位从 1 开始编号")]
pub struct SlotIndexError(pub u32);

// ============================================================================
// 类型别名
// ============================================================================

/// patch 槽位索引（`patch_icpp(i)`）
pub type PatchIndex = SlotId<PatchTag>;

/// fluid 槽位索引（`fluid_pp(i)`）
pub type FluidIndex = SlotId<FluidTag>;
