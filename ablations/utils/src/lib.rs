//! 评估程序依赖的通用组件.

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 向 `w` 写出一条简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}
