#![warn(missing_docs)]

//! 核心库. 对 3D 体数据模型的输出标签与真值标签进行检测级与体素级的精度评估.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 流程
//!
//! 对于每个 case:
//!
//! 1. 读取真值标签与预测标签, 将二者统一为 `u16` 标签, 并把预测标签的几何信息
//!   (原点, 方向, 体素间距) 直接覆写为真值标签的几何信息 ([`data::align`]).
//! 2. 将所有非零标签视为同一前景, 计算 Dice 与 Jaccard 系数 ([`metrics::overlap`]).
//! 3. 在两个标签体上分别提取连通分量, 丢弃物理体积小于单位球体积的分量,
//!   再计算剩余分量的物理质心 ([`components`]).
//! 4. 以距离容差匹配真值质心与预测质心, 统计 TP / FP / FN ([`metrics::matching`]).
//!
//! 每个 stride 下所有 case 的结果由 [`evaluate::StrideAggregate`] 折叠汇总.
//!
//! # 注意
//!
//! 1. 质心匹配 **不是** 一对一的: 一个预测质心可以同时命中多个真值质心.
//!   这是刻意保留的行为.
//! 2. Dice / Jaccard 的平均值默认以数据目录下的 **全部条目数** 为分母,
//!   包括缺少预测结果而被跳过的 case. 见 [`config::AveragePolicy`].
//! 3. 所有可能出现零分母的比率都以 `Option<f64>` 表示, `None` 即 "未定义".

/// 三维索引, 按 `(z, h, w)` 排列.
pub type Idx3d = (usize, usize, usize);

/// 物理空间中的三维点 / 向量, 按 nifti 惯用的 `(x, y, z)` 排列.
pub type Point3 = [f64; 3];

/// 3x3 方向矩阵, 行优先存储.
pub type Mat3 = [[f64; 3]; 3];

/// 比率. 分母为零时为 `None`.
pub type Rate = Option<f64>;

/// 3D 标签体基础数据结构.
pub mod data;

pub use data::{Geometry, LabelVolume, VolumeAttr};

pub mod components;
pub mod config;
pub mod consts;
pub mod dataset;
mod error;
pub mod evaluate;
pub mod metrics;
pub mod prelude;

pub use error::{EvalError, EvalResult, UnknownOverlapMethod};

/// 计算 `num / den`. 当 `den` 为 0 时返回 `None`.
#[inline]
pub fn ratio(num: u64, den: u64) -> Rate {
    match den {
        0 => None,
        den => Some(num as f64 / den as f64),
    }
}
