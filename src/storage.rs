//! Gnuplot data files.
//!
//! A data file is a caption line followed by one tab-separated row per data
//! point. Columns are written side by side, optionally after a 0-based row
//! index.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

const DELIMITER: char = '\t';

/// One column of a data file. Integer columns are written exactly as logged.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, row: usize) -> String {
        match self {
            Column::Int(v) => v[row].to_string(),
            Column::Float(v) => v[row].to_string(),
        }
    }
}

impl From<Vec<i64>> for Column {
    fn from(values: Vec<i64>) -> Self {
        Column::Int(values)
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::Float(values)
    }
}

/// Parallel columns to be written as one gnuplot data file.
#[derive(Debug, Clone)]
pub struct GnuplotTable {
    pub caption: String,
    pub columns: Vec<Column>,
    /// Prepend a 0-based row index column.
    pub row_index: bool,
}

impl GnuplotTable {
    pub fn new(caption: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            caption: caption.into(),
            columns,
            row_index: false,
        }
    }

    pub fn with_row_index(mut self) -> Self {
        self.row_index = true;
        self
    }

    /// Number of data rows. Fails if the columns disagree.
    pub fn rows(&self) -> Result<usize> {
        let Some(first) = self.columns.first() else {
            return Ok(0);
        };
        if let Some((i, col)) = self
            .columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != first.len())
        {
            return Err(anyhow!(
                "column {} has {} values, column 0 has {}",
                i,
                col.len(),
                first.len()
            ));
        }
        Ok(first.len())
    }

    /// Write the table to `w`. Returns the number of data rows.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<usize> {
        let rows = self.rows()?;
        writeln!(w, "{}", self.caption)?;
        let mut line = String::new();
        for r in 0..rows {
            line.clear();
            if self.row_index {
                line.push_str(&r.to_string());
            }
            for col in &self.columns {
                if !line.is_empty() {
                    line.push(DELIMITER);
                }
                line.push_str(&col.cell(r));
            }
            writeln!(w, "{line}")?;
        }
        w.flush()?;
        Ok(rows)
    }
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create directory {}", dir.display()))?;
    }
    Ok(())
}

/// Export `table` to `path`, creating the output directory on demand.
pub fn export_gnuplot(path: &Path, table: &GnuplotTable) -> Result<usize> {
    // validate before truncating an existing file
    table.rows().with_context(|| format!("export {}", path.display()))?;
    ensure_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let rows = table
        .write_to(BufWriter::new(file))
        .with_context(|| format!("write {}", path.display()))?;
    log::debug!("wrote {} rows to {}", rows, path.display());
    Ok(rows)
}

/// Read a gnuplot data file back as its caption and numeric rows.
pub fn read_gnuplot(path: &Path) -> Result<(String, Vec<Vec<f64>>)> {
    let reader = crate::parse::open_input(path)?;
    let mut lines = reader.lines();
    let caption = match lines.next() {
        Some(line) => line.with_context(|| format!("read {}", path.display()))?,
        None => return Err(anyhow!("{} is empty, expected a caption line", path.display())),
    };

    let mut rows = Vec::new();
    for (n, line) in lines.enumerate() {
        let line = line.with_context(|| format!("read {}", path.display()))?;
        let row = line
            .split(DELIMITER)
            .map(|s| s.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            // caption is line 1
            .with_context(|| format!("{}:{}", path.display(), n + 2))?;
        rows.push(row);
    }
    Ok((caption, rows))
}
