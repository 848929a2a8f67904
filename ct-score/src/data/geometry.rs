//! 体数据的物理几何信息: 原点, 方向矩阵, 体素间距.
//!
//! 所有量都按 nifti 惯用的 `(x, y, z)` 顺序存储, 其中 `x` 对应切片的宽方向,
//! `y` 对应高方向, `z` 对应相邻切片方向. 这与 [`crate::Idx3d`] 的 `(z, h, w)` 顺序相反.

use nifti::NiftiHeader;

use crate::{Mat3, Point3};

const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// 体数据从连续体素索引到物理坐标的仿射映射.
///
/// `p = origin + direction * diag(spacing) * (i, j, k)`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    origin: Point3,
    direction: Mat3,
    spacing: Point3,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::identity()
    }
}

impl Geometry {
    /// 构建几何信息.
    ///
    /// `spacing` 的每个分量必须为有限正数, `origin` 与 `direction` 必须有限,
    /// 否则返回 `None`.
    pub fn new(origin: Point3, direction: Mat3, spacing: Point3) -> Option<Self> {
        let finite = origin.iter().chain(direction.iter().flatten()).all(|v| v.is_finite());
        let positive = spacing.iter().all(|s| s.is_finite() && *s > 0.0);
        (finite && positive).then_some(Self {
            origin,
            direction,
            spacing,
        })
    }

    /// 原点为 0, 方向为单位阵, 体素间距为 1.
    #[inline]
    pub const fn identity() -> Self {
        Self {
            origin: [0.0; 3],
            direction: IDENTITY,
            spacing: [1.0; 3],
        }
    }

    /// 原点为 0, 方向为单位阵, 体素间距为 `spacing`. 间距不合法时返回 `None`.
    #[inline]
    pub fn with_spacing(spacing: Point3) -> Option<Self> {
        Self::new([0.0; 3], IDENTITY, spacing)
    }

    /// 从 nifti header 解析几何信息.
    ///
    /// 优先使用 sform (`sform_code > 0`), 其次使用 qform 四元数 (`qform_code > 0`),
    /// 都不存在时退化为单位方向和零原点. 为 0 或非有限值的 `pixdim` 分量按 1 处理,
    /// 负数取绝对值.
    pub fn from_header(h: &NiftiHeader) -> Self {
        let pix_dim = [h.pixdim[1], h.pixdim[2], h.pixdim[3]].map(|s| sanitize_spacing(s as f64));

        if h.sform_code > 0 {
            Self::from_sform(h, pix_dim)
        } else if h.qform_code > 0 {
            Self::from_qform(h, pix_dim)
        } else {
            Self {
                origin: [0.0; 3],
                direction: IDENTITY,
                spacing: pix_dim,
            }
        }
    }

    /// sform 的每一列是 "方向 * 间距". 列的模长即间距.
    fn from_sform(h: &NiftiHeader, pix_dim: Point3) -> Self {
        let rows = [h.srow_x, h.srow_y, h.srow_z].map(|r| r.map(|v| v as f64));
        let spacing: Point3 = std::array::from_fn(|c| {
            let norm = rows.iter().map(|r| r[c] * r[c]).sum::<f64>().sqrt();
            if norm.is_finite() && norm > 0.0 {
                norm
            } else {
                pix_dim[c]
            }
        });
        let mut direction = [[0.0; 3]; 3];
        for (r, row) in rows.iter().enumerate() {
            for c in 0..3 {
                direction[r][c] = row[c] / spacing[c];
            }
        }
        Self {
            origin: rows.map(|r| r[3]),
            direction,
            spacing,
        }
    }

    /// 由单位四元数 `(a, b, c, d)` 还原旋转矩阵, `qfac` (即 `pixdim[0]`) 决定第三列符号.
    fn from_qform(h: &NiftiHeader, pix_dim: Point3) -> Self {
        let (b, c, d) = (
            h.quatern_b as f64,
            h.quatern_c as f64,
            h.quatern_d as f64,
        );
        let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();
        let qfac = if h.pixdim[0] < 0.0 { -1.0 } else { 1.0 };

        let mut direction = [
            [
                a * a + b * b - c * c - d * d,
                2.0 * (b * c - a * d),
                2.0 * (b * d + a * c),
            ],
            [
                2.0 * (b * c + a * d),
                a * a + c * c - b * b - d * d,
                2.0 * (c * d - a * b),
            ],
            [
                2.0 * (b * d - a * c),
                2.0 * (c * d + a * b),
                a * a + d * d - c * c - b * b,
            ],
        ];
        for row in direction.iter_mut() {
            row[2] *= qfac;
        }
        Self {
            origin: [h.quatern_x, h.quatern_y, h.quatern_z].map(|v| v as f64),
            direction,
            spacing: pix_dim,
        }
    }

    /// 原点, 即索引 `(0, 0, 0)` 体素中心的物理坐标.
    #[inline]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// 方向矩阵. 第 `c` 列是第 `c` 个体素轴在物理空间中的单位方向.
    #[inline]
    pub fn direction(&self) -> &Mat3 {
        &self.direction
    }

    /// 体素间距, `(x, y, z)` 顺序.
    #[inline]
    pub fn spacing(&self) -> &Point3 {
        &self.spacing
    }

    /// 单个体素的物理体积.
    #[inline]
    pub fn voxel_volume(&self) -> f64 {
        self.spacing.iter().product()
    }

    /// 将连续体素索引 `(i, j, k)` (即 `(x, y, z)` 顺序) 转换为物理坐标.
    pub fn index_to_physical(&self, ijk: Point3) -> Point3 {
        std::array::from_fn(|r| {
            self.origin[r]
                + (0..3)
                    .map(|c| self.direction[r][c] * self.spacing[c] * ijk[c])
                    .sum::<f64>()
        })
    }
}

/// 体素间距修正: 负数取绝对值, 0 或非有限值按 1 处理.
#[inline]
fn sanitize_spacing(s: f64) -> f64 {
    let s = s.abs();
    if s.is_finite() && s > 0.0 {
        s
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::Geometry;
    use nifti::NiftiHeader;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn point_eq(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| f64_eq(*x, *y))
    }

    #[test]
    fn test_geometry_invalid_spacing() {
        assert!(Geometry::with_spacing([1.0, 0.0, 1.0]).is_none());
        assert!(Geometry::with_spacing([1.0, -2.0, 1.0]).is_none());
        assert!(Geometry::with_spacing([f64::NAN, 1.0, 1.0]).is_none());
        assert!(Geometry::with_spacing([0.5, 0.5, 2.5]).is_some());
    }

    #[test]
    fn test_index_to_physical() {
        let g = Geometry::new(
            [10.0, -5.0, 2.0],
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            [0.5, 0.5, 2.0],
        )
        .unwrap();
        assert!(point_eq(g.index_to_physical([0.0, 0.0, 0.0]), [10.0, -5.0, 2.0]));
        assert!(point_eq(g.index_to_physical([2.0, 4.0, 1.5]), [11.0, -3.0, 5.0]));
        assert!(f64_eq(g.voxel_volume(), 0.5));

        // 绕 z 轴旋转 90 度: x 轴映射到物理 y 方向.
        let r = Geometry::new(
            [0.0; 3],
            [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            [2.0, 1.0, 1.0],
        )
        .unwrap();
        assert!(point_eq(r.index_to_physical([1.0, 0.0, 0.0]), [0.0, 2.0, 0.0]));
        assert!(point_eq(r.index_to_physical([0.0, 3.0, 0.0]), [-3.0, 0.0, 0.0]));
    }

    #[test]
    fn test_from_header_sform() {
        let mut h = NiftiHeader::default();
        h.pixdim = [1.0, 9.0, 9.0, 9.0, 1.0, 1.0, 1.0, 1.0];
        h.sform_code = 1;
        h.srow_x = [-0.75, 0.0, 0.0, 100.0];
        h.srow_y = [0.0, 0.75, 0.0, -20.0];
        h.srow_z = [0.0, 0.0, 2.5, 7.0];

        let g = Geometry::from_header(&h);
        assert!(point_eq(*g.origin(), [100.0, -20.0, 7.0]));
        assert!(point_eq(*g.spacing(), [0.75, 0.75, 2.5]));
        assert!(f64_eq(g.direction()[0][0], -1.0));
        assert!(f64_eq(g.direction()[1][1], 1.0));
        assert!(f64_eq(g.direction()[2][2], 1.0));
    }

    #[test]
    fn test_from_header_qform_identity() {
        let mut h = NiftiHeader::default();
        h.pixdim = [1.0, 0.75, 0.75, 3.0, 1.0, 1.0, 1.0, 1.0];
        h.sform_code = 0;
        h.qform_code = 1;
        (h.quatern_b, h.quatern_c, h.quatern_d) = (0.0, 0.0, 0.0);
        (h.quatern_x, h.quatern_y, h.quatern_z) = (1.0, 2.0, 3.0);

        let g = Geometry::from_header(&h);
        assert!(point_eq(*g.origin(), [1.0, 2.0, 3.0]));
        assert!(point_eq(*g.spacing(), [0.75, 0.75, 3.0]));
        assert_eq!(g.direction(), Geometry::identity().direction());
    }

    #[test]
    fn test_from_header_qform_flipped() {
        let mut h = NiftiHeader::default();
        h.pixdim = [-1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        h.sform_code = 0;
        h.qform_code = 1;
        (h.quatern_b, h.quatern_c, h.quatern_d) = (0.0, 0.0, 0.0);

        let g = Geometry::from_header(&h);
        assert!(f64_eq(g.direction()[2][2], -1.0));
    }

    #[test]
    fn test_from_header_fallback() {
        let mut h = NiftiHeader::default();
        h.pixdim = [1.0, 0.0, f32::NAN, -2.0, 1.0, 1.0, 1.0, 1.0];
        h.sform_code = 0;
        h.qform_code = 0;

        let g = Geometry::from_header(&h);
        assert!(point_eq(*g.spacing(), [1.0, 1.0, 2.0]));
        assert!(point_eq(*g.origin(), [0.0, 0.0, 0.0]));
    }
}
