//! 体数据对齐: 统一标签类型, 并把预测标签的几何信息覆写为真值标签的几何信息.
//!
//! 这里 **不做** 重采样或插值. 两个体数据被假定已经共享同一个体素网格,
//! 对齐只是一次元信息的直接覆写. 网格形状不一致时直接报错.

use crate::data::{LabelVolume, VolumeAttr};
use crate::error::{EvalError, EvalResult};

/// 将任意体素值转换为规范的 `u16` 标签.
///
/// 小数部分向零截断, 超出范围的值饱和到 `[0, u16::MAX]`, `NaN` 视为背景.
#[inline]
pub fn cast_label(v: f32) -> u16 {
    v as u16
}

/// 以 `ground_truth` 为几何基准对齐 `output`.
///
/// 返回几何信息 (原点, 方向, 体素间距) 已被覆写为 `ground_truth` 的 `output`.
/// 如果二者体素网格形状不同, 返回 `Err(EvalError::GeometryMismatch)`.
pub fn align_to(ground_truth: &LabelVolume, mut output: LabelVolume) -> EvalResult<LabelVolume> {
    if ground_truth.shape() != output.shape() {
        return Err(EvalError::GeometryMismatch(
            ground_truth.shape(),
            output.shape(),
        ));
    }
    output.stamp_geometry(ground_truth.geometry());
    Ok(output)
}
