// src/dataset/arrow.rs

use anyhow::Result;
use arrow::{
    array::{ArrayRef, Float64Array, Int32Array},
    datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use super::{YearTable, YEAR};

/// `Year` → Int32, every metric → Float64. Nothing is nullable.
pub fn build_arrow_schema(table: &YearTable) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = std::iter::once(ArrowField::new(YEAR, DataType::Int32, false))
        .chain(
            table
                .columns()
                .iter()
                .map(|c| ArrowField::new(&c.name, DataType::Float64, false)),
        )
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

/// The whole table as one record batch.
pub fn to_record_batch(table: &YearTable) -> Result<RecordBatch> {
    let schema = build_arrow_schema(table);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns().len() + 1);
    arrays.push(Arc::new(Int32Array::from(table.years().to_vec())));
    for col in table.columns() {
        arrays.push(Arc::new(Float64Array::from(col.values.clone())));
    }
    RecordBatch::try_new(schema, arrays).map_err(Into::into)
}
