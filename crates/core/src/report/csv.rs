use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::model::{BenchmarkType, Label, ResultRow};

pub const DELIMITER: u8 = b';';
pub const BASE_COLUMNS: [&str; 7] =
    ["type", "benchmark", "program", "expected", "result", "correct", "changes"];
pub const SOURCE_COLUMNS: [&str; 2] = ["old_src", "new_src"];

fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "True" | "true" => Ok(true),
        "False" | "false" => Ok(false),
        other => Err(anyhow!("Invalid correct value '{}'", other)),
    }
}

/// Incremental writer for the result table; every row is flushed as written.
pub struct ResultWriter<W: Write> {
    writer: ::csv::Writer<W>,
    with_sources: bool,
}

impl ResultWriter<File> {
    pub fn create(path: &Path, with_sources: bool) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create results CSV at {}", path.display()))?;
        Self::from_writer(file, with_sources)
    }
}

impl<W: Write> ResultWriter<W> {
    pub fn from_writer(inner: W, with_sources: bool) -> Result<Self> {
        let mut writer = ::csv::WriterBuilder::new().delimiter(DELIMITER).from_writer(inner);
        let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
        if with_sources {
            header.extend(SOURCE_COLUMNS);
        }
        writer.write_record(&header).context("Failed to write results CSV header")?;
        writer.flush().context("Failed to flush results CSV")?;
        Ok(Self { writer, with_sources })
    }

    pub fn write_row(&mut self, row: &ResultRow) -> Result<()> {
        let mut record = vec![
            row.benchmark_type.as_str().to_string(),
            row.benchmark.clone(),
            row.program.clone(),
            row.expected.as_str().to_string(),
            row.result.clone(),
            format_bool(row.correct).to_string(),
            row.changes.clone(),
        ];
        if self.with_sources {
            record.push(row.old_src.clone().unwrap_or_default());
            record.push(row.new_src.clone().unwrap_or_default());
        }
        self.writer.write_record(&record).context("Failed to write results CSV row")?;
        self.writer.flush().context("Failed to flush results CSV")?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| anyhow!("Failed to finish results CSV: {}", e.error()))
    }
}

/// Read a result table written by `ResultWriter`.
pub fn read_results(path: &Path) -> Result<Vec<ResultRow>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to read results CSV at {}", path.display()))?;
    parse_results(file).with_context(|| format!("Failed to parse results CSV {}", path.display()))
}

pub fn parse_results<R: Read>(reader: R) -> Result<Vec<ResultRow>> {
    let mut reader = ::csv::ReaderBuilder::new().delimiter(DELIMITER).from_reader(reader);
    let headers = reader.headers().context("Missing results CSV header")?.clone();
    let column = |name: &str| -> Result<usize> {
        headers.iter().position(|h| h == name).ok_or_else(|| anyhow!("Missing column '{}'", name))
    };
    let idx: Vec<usize> = BASE_COLUMNS.iter().map(|c| column(*c)).collect::<Result<_>>()?;
    let old_src = headers.iter().position(|h| h == SOURCE_COLUMNS[0]);
    let new_src = headers.iter().position(|h| h == SOURCE_COLUMNS[1]);

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Invalid record {}", line + 1))?;
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        rows.push(ResultRow {
            benchmark_type: field(idx[0]).parse::<BenchmarkType>().map_err(|e: String| anyhow!(e))?,
            benchmark: field(idx[1]),
            program: field(idx[2]),
            expected: field(idx[3]).parse::<Label>().map_err(|e: String| anyhow!(e))?,
            result: field(idx[4]),
            correct: parse_bool(&field(idx[5]))?,
            changes: field(idx[6]),
            old_src: old_src.map(field),
            new_src: new_src.map(field),
        });
    }
    Ok(rows)
}
