//! 通用常量.

use std::f64::consts::PI;

/// 标签值.
pub mod label {
    /// 背景的体素值.
    pub const BACKGROUND: u16 = 0;

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(v: u16) -> bool {
        v == BACKGROUND
    }

    /// 体素是否是前景 (任意非零标签)?
    #[inline]
    pub const fn is_foreground(v: u16) -> bool {
        !is_background(v)
    }
}

/// 半径为 1 的球的体积, 即 `4π/3`.
pub const UNIT_SPHERE_VOLUME: f64 = 4.0 * PI / 3.0;

/// 连通分量的最小物理体积. 小于该值的分量被视为噪声.
///
/// 该门限是固定的, 不提供配置入口.
pub const MIN_COMPONENT_VOLUME: f64 = UNIT_SPHERE_VOLUME;

/// 质心匹配的默认距离容差 (物理单位).
pub const DEFAULT_TOLERANCE: f64 = 3.0;

/// case 目录下真值标签的默认文件名.
pub const GROUND_TRUTH_FILE: &str = "label_crop.nii.gz";

/// case 目录下预测标签的默认文件名. 由外部推理进程写出.
pub const PREDICTION_FILE: &str = "label_vnet.nii.gz";
