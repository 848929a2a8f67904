//! 运行时错误.

use crate::Idx3d;

/// 单个 case 评估过程中的错误.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// 真值与预测的体素网格形状不一致. 参数依次为真值形状和预测形状, 均按 `(z, h, w)`.
    #[error("voxel grids differ: ground truth {0:?}, output {1:?}")]
    GeometryMismatch(Idx3d, Idx3d),

    /// 文件中的数据不是三维体数据. 参数为 nifti 顺序的原始形状.
    #[error("not a 3D volume: shape {0:?}")]
    NotAVolume(Vec<usize>),

    /// 读取 nifti 文件失败.
    #[error("failed to read label volume: {0}")]
    Nifti(#[from] nifti::NiftiError),
}

/// 未知的重叠度计算方法名.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid overlap method `{0}`, expected `dice` or `jaccard`")]
pub struct UnknownOverlapMethod(pub String);

/// 评估运行时结果.
pub type EvalResult<T> = Result<T, EvalError>;
