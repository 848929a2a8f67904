//! 3D 连通分量提取.
//!
//! 所有非零标签被视为同一个前景类别. 对相邻的前景体素做 BFS 标记, 获得按扫描顺序编号
//! (从 1 开始) 的连通分量, 然后统计每个分量的物理体积与物理质心.
//!
//! 物理体积小于 [`MIN_COMPONENT_VOLUME`] (单位球体积) 的分量被视为噪声,
//! 不会进入后续的质心匹配.

mod neighbour;

use std::collections::VecDeque;
use std::str::FromStr;

use itertools::Either;
use ndarray::{Array3, ArrayView3};

use crate::consts::label::{is_background, is_foreground};
use crate::consts::MIN_COMPONENT_VOLUME;
use crate::data::{Geometry, LabelVolume, VolumeAttr};
use crate::{Idx3d, Point3};

/// 体素相邻规则.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Connectivity {
    /// 共面相邻, 即 6-邻域.
    #[default]
    Face,

    /// 共面, 共边或共顶点相邻, 即 26-邻域.
    Full,
}

impl FromStr for Connectivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "face" | "6" => Ok(Self::Face),
            "full" | "26" => Ok(Self::Full),
            other => Err(format!("unknown connectivity `{other}`")),
        }
    }
}

impl Connectivity {
    /// 获取 `pos` 的所有邻居索引. 不检查越界.
    fn neighbours(self, pos: Idx3d) -> impl Iterator<Item = Idx3d> {
        match self {
            Self::Face => Either::Left(neighbour::neighbour6(pos).into_iter()),
            Self::Full => Either::Right(neighbour::neighbour26(pos)),
        }
    }
}

/// 单个连通分量的统计信息.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    /// 分量编号, 从 1 开始, 按体素扫描顺序分配.
    pub id: u32,

    /// 体素个数.
    pub voxels: usize,

    /// 物理体积, 即体素个数乘以单个体素的物理体积.
    pub physical_size: f64,

    /// 物理质心, `(x, y, z)` 顺序.
    pub centroid: Point3,
}

impl Component {
    /// 该分量是否因体积过小而被视为噪声?
    #[inline]
    pub fn is_noise(&self) -> bool {
        self.physical_size < MIN_COMPONENT_VOLUME
    }
}

/// 连通分量标记图. 每个体素保存其所属分量的编号, 背景为 0.
#[derive(Debug, Clone)]
pub struct ComponentMap {
    geometry: Geometry,
    ids: Array3<u32>,
    len: u32,
}

impl VolumeAttr for ComponentMap {
    #[inline]
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    fn shape(&self) -> Idx3d {
        self.ids.dim()
    }
}

impl ComponentMap {
    /// 按照 `connectivity` 规则标记 `volume` 的所有连通分量.
    ///
    /// 两个体素属于同一个分量, 当且仅当存在一条从其中一个到另一个的相邻路径,
    /// 且路径上所有体素都是前景. 标签值不同的相邻前景体素属于同一个分量.
    pub fn label(volume: &LabelVolume, connectivity: Connectivity) -> Self {
        let data = volume.data();
        let mut ids = Array3::<u32>::zeros(volume.shape());
        let mut len = 0u32;
        let mut bfs_q = VecDeque::with_capacity(64);

        for (pos, &label) in data.indexed_iter() {
            if is_background(label) || ids[pos] != 0 {
                continue;
            }
            len += 1;
            let id = len;
            ids[pos] = id;
            bfs_q.push_back(pos);

            // bfs
            while let Some(cur) = bfs_q.pop_front() {
                for n in connectivity.neighbours(cur) {
                    if volume.check(&n) && ids[n] == 0 && is_foreground(data[n]) {
                        ids[n] = id;
                        bfs_q.push_back(n);
                    }
                }
            }
        }

        Self {
            geometry: *volume.geometry(),
            ids,
            len,
        }
    }

    /// 分量个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// 是否不存在任何分量?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 获得编号图的一份不可变 shallow copy.
    #[inline]
    pub fn ids(&self) -> ArrayView3<'_, u32> {
        self.ids.view()
    }

    /// 统计每个分量的体素个数, 物理体积和物理质心. 结果按编号升序排列.
    ///
    /// 质心为所有体素连续索引平均值对应的物理坐标,
    /// 与所有体素物理坐标的平均值相同.
    pub fn statistics(&self) -> Vec<Component> {
        let mut acc = vec![(0usize, [0.0f64; 3]); self.len()];
        for ((z, h, w), &id) in self.ids.indexed_iter() {
            if id == 0 {
                continue;
            }
            let (cnt, sum) = &mut acc[id as usize - 1];
            *cnt += 1;
            sum[0] += w as f64;
            sum[1] += h as f64;
            sum[2] += z as f64;
        }

        let voxel = self.voxel();
        acc.into_iter()
            .enumerate()
            .map(|(i, (cnt, sum))| {
                debug_assert!(cnt >= 1);
                Component {
                    id: i as u32 + 1,
                    voxels: cnt,
                    physical_size: cnt as f64 * voxel,
                    centroid: self
                        .geometry
                        .index_to_physical(sum.map(|s| s / cnt as f64)),
                }
            })
            .collect()
    }
}

/// 丢弃物理体积小于 [`MIN_COMPONENT_VOLUME`] 的分量, 保持原有顺序.
#[inline]
pub fn retain_significant(mut components: Vec<Component>) -> Vec<Component> {
    components.retain(|c| !c.is_noise());
    components
}

/// 连通分量提取器.
#[derive(Copy, Clone, Debug, Default)]
pub struct ComponentExtractor {
    connectivity: Connectivity,
}

impl ComponentExtractor {
    /// 以给定的相邻规则创建提取器.
    #[inline]
    pub const fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }

    /// 相邻规则.
    #[inline]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// 提取 `volume` 的全部连通分量 (不过滤噪声), 按编号升序排列.
    #[inline]
    pub fn extract(&self, volume: &LabelVolume) -> Vec<Component> {
        ComponentMap::label(volume, self.connectivity).statistics()
    }

    /// 提取 `volume` 中不是噪声的连通分量.
    #[inline]
    pub fn significant(&self, volume: &LabelVolume) -> Vec<Component> {
        retain_significant(self.extract(volume))
    }

    /// 提取 `volume` 中不是噪声的连通分量的质心, 按分量编号升序排列.
    pub fn centroids(&self, volume: &LabelVolume) -> Vec<Point3> {
        self.significant(volume)
            .into_iter()
            .map(|c| c.centroid)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ComponentExtractor, ComponentMap, Connectivity};
    use crate::data::{Geometry, LabelVolume};
    use ndarray::{s, Array3};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn point_eq(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| f64_eq(*x, *y))
    }

    /// 一个单体素分量位于 (0, 0, 0), 一个 3x3x3 立方体位于 z: 0..3, h: 0..3, w: 5..8.
    fn cube_and_dot() -> LabelVolume {
        let mut data = Array3::<u16>::zeros((4, 4, 9));
        data[(0, 0, 0)] = 1;
        data.slice_mut(s![0..3, 0..3, 5..8]).fill(1);
        LabelVolume::new(data, Geometry::identity())
    }

    #[test]
    fn test_components_scan_order() {
        let v = cube_and_dot();
        let cs = ComponentExtractor::default().extract(&v);
        assert_eq!(cs.len(), 2);

        assert_eq!(cs[0].id, 1);
        assert_eq!(cs[0].voxels, 1);
        assert!(point_eq(cs[0].centroid, [0.0, 0.0, 0.0]));

        assert_eq!(cs[1].id, 2);
        assert_eq!(cs[1].voxels, 27);
        assert!(f64_eq(cs[1].physical_size, 27.0));
        // (x, y, z) = (w, h, z) 的平均值.
        assert!(point_eq(cs[1].centroid, [6.0, 1.0, 1.0]));
    }

    #[test]
    fn test_components_noise_filter() {
        let v = cube_and_dot();
        let cs = ComponentExtractor::default().significant(&v);
        assert_eq!(cs.len(), 1);
        assert_eq!(cs[0].id, 2);

        let centroids = ComponentExtractor::default().centroids(&v);
        assert_eq!(centroids.len(), 1);
        assert!(point_eq(centroids[0], [6.0, 1.0, 1.0]));
    }

    #[test]
    fn test_components_noise_threshold() {
        // 4 个单位体素: 4 < 4π/3, 为噪声; 5 个单位体素则保留.
        let mut data = Array3::<u16>::zeros((1, 3, 12));
        data.slice_mut(s![0, 0, 0..4]).fill(1);
        data.slice_mut(s![0, 2, 0..5]).fill(1);
        let v = LabelVolume::new(data, Geometry::identity());

        let all = ComponentExtractor::default().extract(&v);
        assert_eq!(all.len(), 2);
        assert!(all[0].is_noise());
        assert!(!all[1].is_noise());

        let kept = ComponentExtractor::default().significant(&v);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].voxels, 5);
    }

    #[test]
    fn test_components_only_noise() {
        let mut data = Array3::<u16>::zeros((3, 3, 3));
        data[(0, 0, 0)] = 1;
        data[(2, 2, 2)] = 1;
        let v = LabelVolume::new(data, Geometry::identity());
        assert_eq!(ComponentExtractor::default().extract(&v).len(), 2);
        assert!(ComponentExtractor::default().centroids(&v).is_empty());
    }

    #[test]
    fn test_components_connectivity() {
        let mut data = Array3::<u16>::zeros((2, 2, 2));
        data[(0, 0, 0)] = 1;
        data[(1, 1, 1)] = 1;
        let v = LabelVolume::new(data, Geometry::identity());

        let face = ComponentMap::label(&v, Connectivity::Face);
        assert_eq!(face.len(), 2);
        assert_eq!(face.ids()[(0, 0, 0)], 1);
        assert_eq!(face.ids()[(1, 1, 1)], 2);

        let full = ComponentMap::label(&v, Connectivity::Full);
        assert_eq!(full.len(), 1);
        assert_eq!(full.ids()[(1, 1, 1)], 1);
        assert!(point_eq(full.statistics()[0].centroid, [0.5, 0.5, 0.5]));
    }

    /// 标签值不同的相邻前景体素合并为同一个分量.
    #[test]
    fn test_components_merge_labels() {
        let mut data = Array3::<u16>::zeros((2, 2, 2));
        data.slice_mut(s![0, .., ..]).fill(1);
        data.slice_mut(s![1, .., ..]).fill(2);
        let v = LabelVolume::new(data, Geometry::identity());

        let cs = ComponentExtractor::default().extract(&v);
        assert_eq!(cs.len(), 1);
        assert_eq!(cs[0].voxels, 8);
        assert!(!cs[0].is_noise());

        let centroids = ComponentExtractor::default().centroids(&v);
        assert_eq!(centroids.len(), 1);
        assert!(point_eq(centroids[0], [0.5, 0.5, 0.5]));
    }

    #[test]
    fn test_components_physical_units() {
        let g = Geometry::new(
            [100.0, 50.0, -10.0],
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            [2.0, 2.0, 2.0],
        )
        .unwrap();
        let mut data = Array3::<u16>::zeros((3, 3, 3));
        data[(1, 2, 0)] = 4;
        let v = LabelVolume::new(data, g);

        // 单个体素的物理体积为 8, 不是噪声.
        let cs = ComponentExtractor::default().significant(&v);
        assert_eq!(cs.len(), 1);
        assert!(f64_eq(cs[0].physical_size, 8.0));
        assert!(point_eq(cs[0].centroid, [100.0, 54.0, -8.0]));
    }

    #[test]
    fn test_connectivity_neighbours() {
        assert_eq!(Connectivity::Face.neighbours((1, 1, 1)).count(), 6);
        assert_eq!(Connectivity::Full.neighbours((1, 1, 1)).count(), 26);
        assert!(Connectivity::Face
            .neighbours((0, 0, 0))
            .any(|n| n == (usize::MAX, 0, 0)));
    }

    #[test]
    fn test_connectivity_parse() {
        assert_eq!("face".parse(), Ok(Connectivity::Face));
        assert_eq!("26".parse(), Ok(Connectivity::Full));
        assert!("corner".parse::<Connectivity>().is_err());
    }

    #[test]
    fn test_components_empty() {
        let v = LabelVolume::new(Array3::zeros((2, 2, 2)), Geometry::identity());
        let map = ComponentMap::label(&v, Connectivity::Full);
        assert!(map.is_empty());
        assert!(map.statistics().is_empty());
    }
}
