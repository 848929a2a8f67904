use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayView, Ix3};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};

use crate::error::{EvalError, EvalResult};
use crate::Idx3d;

pub mod align;
mod geometry;

pub use geometry::Geometry;

/// 将 nifti 的 `[W, H, z, ...]` 形状转换成 `(z, H, W)`. 以后均按照该模式访问.
///
/// 二维数据视为只有一层切片; 第三维之后的维度必须全为 1, 否则返回 `None`.
fn zhw_shape(shape: &[usize]) -> Option<Idx3d> {
    match *shape {
        [w, h] => Some((1, h, w)),
        [w, h, z, ref rest @ ..] if rest.iter().all(|d| *d == 1) => Some((z, h, w)),
        _ => None,
    }
}

/// 3D 体数据的几何属性和部分通用操作.
pub trait VolumeAttr {
    /// 获取几何信息.
    fn geometry(&self) -> &Geometry;

    /// 获取数据形状大小, `(z, h, w)`.
    fn shape(&self) -> Idx3d;

    /// 检查索引是否合法.
    #[inline]
    fn check(&self, (z0, h0, w0): &Idx3d) -> bool {
        let (z, h, w) = self.shape();
        *z0 < z && *h0 < h && *w0 < w
    }

    /// 获取体素的实际体积值.
    #[inline]
    fn voxel(&self) -> f64 {
        self.geometry().voxel_volume()
    }
}

/// 3D 标签体, 包括几何信息和标签数据. 标签值以 `u16` 保存.
#[derive(Debug, Clone)]
pub struct LabelVolume {
    geometry: Geometry,
    data: Array3<u16>,
}

impl VolumeAttr for LabelVolume {
    #[inline]
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }
}

impl Index<Idx3d> for LabelVolume {
    type Output = u16;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl LabelVolume {
    /// 打开 nii 文件格式的 3D 标签. `path` 为 nii (或 nii.gz) 文件的本地路径.
    ///
    /// 任意存储类型的体素值都会经由 [`align::cast_label`] 转换为 `u16`.
    /// 如果文件不是三维数据, 返回 `Err(EvalError::NotAVolume)`.
    pub fn open<P: AsRef<Path>>(path: P) -> EvalResult<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let geometry = Geometry::from_header(obj.header());
        let data = obj.into_volume().into_ndarray::<f32>()?;

        let (z, h, w) =
            zhw_shape(data.shape()).ok_or_else(|| EvalError::NotAVolume(data.shape().to_vec()))?;
        let whz = data
            .mapv(align::cast_label)
            .into_shape((w, h, z))
            .map_err(|_| EvalError::NotAVolume(vec![w, h, z]))?;

        Ok(Self::from_nifti_layout(whz, geometry))
    }

    /// 根据 `(z, h, w)` 排列的标签数据和几何信息直接创建 `LabelVolume`.
    #[inline]
    pub fn new(data: Array3<u16>, geometry: Geometry) -> Self {
        Self { geometry, data }
    }

    /// 根据按照 nifti 惯用标准以 \[w, h, z\] 存储的标签数据和几何信息创建 `LabelVolume`.
    pub fn from_nifti_layout(data: Array3<u16>, geometry: Geometry) -> Self {
        let data = data.permuted_axes([2, 1, 0]);
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert!(data.is_standard_layout());
        Self { geometry, data }
    }

    /// 直接覆写几何信息. 不做任何重采样.
    #[inline]
    pub(crate) fn stamp_geometry(&mut self, geometry: &Geometry) {
        self.geometry = *geometry;
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u16, Ix3> {
        self.data.view()
    }
}
