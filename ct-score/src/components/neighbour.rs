//! 三维邻域索引.

use itertools::iproduct;

use crate::Idx3d;

/// 获得 `(z, h, w)` 的 6-邻居 (共面) 索引. 不检查越界.
#[inline]
pub(crate) fn neighbour6((z, h, w): Idx3d) -> [Idx3d; 6] {
    [
        (z.wrapping_sub(1), h, w),
        (z.saturating_add(1), h, w),
        (z, h.wrapping_sub(1), w),
        (z, h.saturating_add(1), w),
        (z, h, w.wrapping_sub(1)),
        (z, h, w.saturating_add(1)),
    ]
}

/// 获得 `(z, h, w)` 的 26-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour26((z, h, w): Idx3d) -> impl Iterator<Item = Idx3d> {
    iproduct!(-1isize..=1, -1isize..=1, -1isize..=1)
        .filter(|d| *d != (0, 0, 0))
        .map(move |(dz, dh, dw)| {
            (
                z.wrapping_add_signed(dz),
                h.wrapping_add_signed(dh),
                w.wrapping_add_signed(dw),
            )
        })
}
