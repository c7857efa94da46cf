use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use super::{arrow::to_record_batch, YearTable};

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Rename `tmp` over `path` if `written` succeeded. On any failure the temp
/// file is removed so nothing half-written stays in the output directory.
pub(crate) fn commit_tmp(tmp: &Path, path: &Path, written: Result<()>) -> Result<()> {
    let result = written.and_then(|()| {
        fs::rename(tmp, path).with_context(|| format!("renaming {:?} -> {:?}", tmp, path))
    });
    if result.is_err() && tmp.exists() {
        if let Err(e) = fs::remove_file(tmp) {
            warn!(tmp = %tmp.display(), error = %e, "could not remove temp file");
        }
    }
    result
}

/// Write `table` as CSV with a header row, one row per year.
/// Written to a temp file first, then renamed over `path`.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn write_csv<P: AsRef<Path>>(table: &YearTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let tmp = tmp_path(path);
    commit_tmp(&tmp, path, csv_into(table, &tmp))?;
    debug!(rows = table.num_rows(), "csv written");
    Ok(())
}

fn csv_into(table: &YearTable, tmp: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(tmp).with_context(|| format!("creating {:?}", tmp))?;
    wtr.write_record(table.column_names())
        .context("writing CSV header")?;

    for (i, year) in table.years().iter().enumerate() {
        let mut record = Vec::with_capacity(table.columns().len() + 1);
        record.push(year.to_string());
        for col in table.columns() {
            record.push(col.values[i].to_string());
        }
        wtr.write_record(&record)
            .with_context(|| format!("writing CSV row for {}", year))?;
    }
    wtr.flush().with_context(|| format!("flushing {:?}", tmp))?;
    Ok(())
}

/// Write `table` as a single-row-group Snappy Parquet file.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn write_parquet<P: AsRef<Path>>(table: &YearTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let batch = to_record_batch(table).context("building dataset record batch")?;

    let tmp = tmp_path(path);
    commit_tmp(&tmp, path, parquet_into(&batch, &tmp))?;
    debug!(rows = batch.num_rows(), "parquet written");
    Ok(())
}

fn parquet_into(batch: &RecordBatch, tmp: &Path) -> Result<()> {
    let file = File::create(tmp).with_context(|| format!("creating {:?}", tmp))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))
        .context("creating Arrow writer for dataset")?;
    writer.write(batch).context("writing dataset batch")?;
    writer.close().context("closing dataset writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Timeline;
    use arrow::array::{Float64Array, Int32Array};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::tempdir;

    fn sample() -> YearTable {
        let mut tbl = YearTable::new(&Timeline::new(2017, 2020).unwrap());
        tbl.add_column("PESCO_Projects", vec![6.0, 12.0, 18.0, 20.0])
            .unwrap();
        tbl.add_column("Reaction_Time", vec![27.0, 24.0, 21.0, 19.0])
            .unwrap();
        tbl
    }

    #[test]
    fn csv_has_header_and_one_row_per_year() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.csv");
        write_csv(&sample(), &path)?;

        let mut rdr = csv::Reader::from_path(&path)?;
        let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
        assert_eq!(headers, vec!["Year", "PESCO_Projects", "Reaction_Time"]);

        let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>()?;
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[0][0], "2017");
        assert_eq!(rows[3][2].parse::<f64>()?, 19.0);

        // no temp file left behind
        let leftovers = fs::read_dir(dir.path())?.count();
        assert_eq!(leftovers, 1);
        Ok(())
    }

    #[test]
    fn failed_write_leaves_no_temp_file() -> Result<()> {
        let dir = tempdir()?;
        // a non-empty directory in the way makes the final rename fail
        let path = dir.path().join("out.csv");
        fs::create_dir(&path)?;
        fs::write(path.join("keep"), b"x")?;

        assert!(write_csv(&sample(), &path).is_err());
        assert!(write_parquet(&sample(), &path).is_err());
        assert!(!tmp_path(&path).exists());
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn parquet_holds_all_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.parquet");
        write_parquet(&sample(), &path)?;

        let file = File::open(&path)?;
        let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        let batch = reader.next().transpose()?.expect("one batch");
        assert_eq!(batch.num_rows(), 4);
        assert_eq!(batch.num_columns(), 3);

        let years = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int32Array>()
            .expect("Year must be Int32Array");
        assert_eq!(years.value(0), 2017);
        let pesco = batch
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .expect("metrics must be Float64Array");
        assert_eq!(pesco.value(3), 20.0);
        Ok(())
    }
}
