use anyhow::{Context, Result};
use arrow::array::{Array, Float64Array, Int32Array};
use clap::Parser;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::metadata::ColumnChunkMetaData;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::{fs::File, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Print metadata, schema and rows of a dataset written with `--parquet`.
#[derive(Parser, Debug)]
struct Args {
    /// Parquet file to inspect
    path: PathBuf,

    /// Only print metadata and schema
    #[arg(long)]
    no_rows: bool,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    print_metadata(&args)?;
    if !args.no_rows {
        print_rows(&args)?;
    }
    Ok(())
}

fn print_metadata(args: &Args) -> Result<()> {
    let file = File::open(&args.path).with_context(|| format!("opening {:?}", args.path))?;
    let reader = SerializedFileReader::new(file)
        .with_context(|| format!("reading parquet footer of {:?}", args.path))?;
    let meta = reader.metadata();
    let file_meta = meta.file_metadata();

    println!("=== Parquet File: {} ===", args.path.display());
    println!(
        "Created by:           {}",
        file_meta.created_by().unwrap_or("<unknown>")
    );
    println!("Total rows:           {}", file_meta.num_rows());
    println!("Number of row groups: {}", meta.num_row_groups());
    println!();

    for idx in 0..meta.num_row_groups() {
        let rg = meta.row_group(idx);
        println!("--- Row Group {} ({} rows) ---", idx, rg.num_rows());
        for col in rg.columns() {
            print_column_chunk(col);
        }
        println!();
    }
    Ok(())
}

fn print_column_chunk(col: &ColumnChunkMetaData) {
    let descr = col.column_descr();
    let (min, max) = match col.statistics() {
        Some(stats) => (
            stats.min_bytes_opt().map(|b| decode_stat(col, b)),
            stats.max_bytes_opt().map(|b| decode_stat(col, b)),
        ),
        None => (None, None),
    };
    println!(
        "  {:<28} {:<7} {:?} min={} max={}",
        descr.name(),
        format!("{:?}", descr.physical_type()),
        col.compression(),
        min.unwrap_or_else(|| "-".into()),
        max.unwrap_or_else(|| "-".into()),
    );
}

// Year is INT32, every metric is DOUBLE.
fn decode_stat(col: &ColumnChunkMetaData, bytes: &[u8]) -> String {
    use parquet::basic::Type;
    match (col.column_descr().physical_type(), bytes.len()) {
        (Type::INT32, 4) => {
            let mut b = [0u8; 4];
            b.copy_from_slice(bytes);
            i32::from_le_bytes(b).to_string()
        }
        (Type::DOUBLE, 8) => {
            let mut b = [0u8; 8];
            b.copy_from_slice(bytes);
            format!("{:.2}", f64::from_le_bytes(b))
        }
        _ => format!("{:?}", bytes),
    }
}

fn print_rows(args: &Args) -> Result<()> {
    let file = File::open(&args.path).with_context(|| format!("opening {:?}", args.path))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();

    println!("=== Arrow schema ===");
    for field in schema.fields() {
        println!("- {}: {}", field.name(), field.data_type());
    }
    println!();

    let header: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    println!("{}", header.join(","));

    let mut total = 0usize;
    for batch in builder.build()? {
        let batch = batch.context("decoding record batch")?;
        for row in 0..batch.num_rows() {
            let cells: Vec<String> = batch
                .columns()
                .iter()
                .map(|col| {
                    if let Some(a) = col.as_any().downcast_ref::<Int32Array>() {
                        a.value(row).to_string()
                    } else if let Some(a) = col.as_any().downcast_ref::<Float64Array>() {
                        format!("{:.2}", a.value(row))
                    } else {
                        "?".to_string()
                    }
                })
                .collect();
            println!("{}", cells.join(","));
        }
        total += batch.num_rows();
    }
    info!(rows = total, "done");
    Ok(())
}
