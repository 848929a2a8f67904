//! 扫描结果: CSV 报告与文本摘要.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use ct_score::evaluate::StrideReport;
use ct_score::Rate;

/// CSV 表头.
pub const CSV_HEADER: &str = "Stride,TP,FP,FN,Item Sensitivity,Item IoU,DICE,Jaccard";

/// 未定义的比率写为 `nan`.
#[inline]
fn rate_to_csv(r: Rate) -> String {
    match r {
        Some(f) => f.to_string(),
        None => "nan".to_string(),
    }
}

/// 将 `r` 写成一行 CSV.
pub fn write_row<W: Write>(r: &StrideReport, w: &mut W) -> io::Result<()> {
    writeln!(
        w,
        "{},{},{},{},{},{},{},{}",
        r.stride,
        r.true_pos,
        r.false_pos,
        r.false_neg,
        rate_to_csv(r.sensitivity),
        rate_to_csv(r.iou),
        rate_to_csv(r.dice),
        rate_to_csv(r.jaccard),
    )
}

/// 逐行写出的 CSV 报告. 每写一行都会刷新, 中途退出时已完成的 stride 不会丢失.
pub struct CsvReport<W: Write> {
    w: W,
}

impl CsvReport<BufWriter<File>> {
    /// 在 `path` 处创建报告文件. 已存在的文件会被删除后重建.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            fs::remove_file(path)?;
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> CsvReport<W> {
    /// 写出表头并创建报告.
    pub fn new(mut w: W) -> io::Result<Self> {
        writeln!(w, "{CSV_HEADER}")?;
        w.flush()?;
        Ok(Self { w })
    }

    /// 追加一行.
    pub fn push(&mut self, r: &StrideReport) -> io::Result<()> {
        write_row(r, &mut self.w)?;
        self.w.flush()
    }

    /// 取回底层写入器.
    pub fn into_inner(self) -> W {
        self.w
    }
}

/// 将 `r` 的结果写进 `w` 中.
fn describe_into<W: Write>(r: &StrideReport, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Rate) -> String {
        match f {
            Some(f) => format!("{f:.6}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Stride {}:", r.stride)?;
    writeln!(w, "{S4}Entries examined: {}", r.examined)?;
    writeln!(w, "{S4}Cases scored: {}", r.scored)?;
    writeln!(
        w,
        "{S4}TP / FP / FN: {} / {} / {}",
        r.true_pos, r.false_pos, r.false_neg
    )?;
    writeln!(w, "{S4}Item sensitivity: {}", f64_to_display(r.sensitivity))?;
    writeln!(w, "{S4}Item IoU: {}", f64_to_display(r.iou))?;
    writeln!(w, "{S4}Average Dice: {}", f64_to_display(r.dice))?;
    write!(w, "{S4}Average Jaccard: {}", f64_to_display(r.jaccard))?;
    Ok(())
}

/// 扫描最终结果.
pub struct SweepResult {
    data: Vec<StrideReport>,
}

impl SweepResult {
    pub fn from_iter<I: IntoIterator<Item = StrideReport>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 全部 stride 的结果.
    #[inline]
    pub fn reports(&self) -> &[StrideReport] {
        &self.data
    }

    /// 分析运行结果.
    pub fn analyze(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        self.describe_all(&mut out)
    }

    fn describe_all<W: Write>(&self, w: &mut W) -> io::Result<()> {
        utils::sep_to(&mut *w)?;
        for report in self.data.iter() {
            describe_into(report, w)?;
            writeln!(w)?;
            utils::sep_to(&mut *w)?;
        }
        Ok(())
    }
}
