//! CSV parsing into Arrow record batches and the column operations the
//! dataset transforms are built from.
//!
//! Every operation here is a pure function from one `RecordBatch` to another;
//! nothing touches the filesystem or network.

use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Scalar, StringArray};
use arrow::compute::kernels::{cmp, numeric};
use arrow::compute::{self, concat_batches, filter_record_batch};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{DatasetError, Result};

/// Parse a CSV body (header row required) into a single record batch with an
/// inferred schema.
pub fn parse_csv(bytes: &[u8]) -> Result<RecordBatch> {
    let format = Format::default().with_header(true);
    let mut cursor = Cursor::new(bytes);
    let (schema, _) = format.infer_schema(&mut cursor, None)?;
    cursor.set_position(0);

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(8192)
        .build(cursor)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

fn index_of(batch: &RecordBatch, name: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(name)
        .map_err(|_| DatasetError::MissingColumn(name.to_string()))
}

fn replace_column(batch: &RecordBatch, idx: usize, array: ArrayRef) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    let old = &fields[idx];
    let nullable = old.is_nullable() || array.null_count() > 0;
    fields[idx] = Field::new(old.name().clone(), array.data_type().clone(), nullable);

    let mut columns = batch.columns().to_vec();
    columns[idx] = array;
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

fn append_column(batch: &RecordBatch, name: &str, array: ArrayRef) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    fields.push(Field::new(name, array.data_type().clone(), true));

    let mut columns = batch.columns().to_vec();
    columns.push(array);
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Project away the named columns. Names not present in the batch are
/// ignored, which absorbs the index-column header drift across mirror
/// vintages ("" vs `rownames`).
pub fn drop_columns(batch: &RecordBatch, names: &[&str]) -> Result<RecordBatch> {
    let keep: Vec<usize> = batch
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| !names.contains(&f.name().as_str()))
        .map(|(i, _)| i)
        .collect();
    Ok(batch.project(&keep)?)
}

/// Keep only rows where `name` is non-null.
pub fn filter_not_null(batch: &RecordBatch, name: &str) -> Result<RecordBatch> {
    let col = batch.column(index_of(batch, name)?);
    let mask = compute::is_not_null(col)?;
    Ok(filter_record_batch(batch, &mask)?)
}

/// Replace a string column with a boolean flag, true where the value equals
/// `value`.
pub fn flag_equals(batch: &RecordBatch, name: &str, value: &str) -> Result<RecordBatch> {
    let idx = index_of(batch, name)?;
    let target = Scalar::new(StringArray::from(vec![value]));
    let mask = cmp::eq(batch.column(idx), &target)?;
    replace_column(batch, idx, Arc::new(mask))
}

/// Cast the named columns to dictionary-encoded strings, the categorical
/// representation the IPC format round-trips.
pub fn to_categorical(batch: &RecordBatch, names: &[&str]) -> Result<RecordBatch> {
    let dict = DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8));
    let mut out = batch.clone();
    for name in names {
        let idx = index_of(&out, name)?;
        let cast = compute::cast(out.column(idx), &dict)?;
        out = replace_column(&out, idx, cast)?;
    }
    Ok(out)
}

/// Cast every column not listed in `except` to `Float32`.
pub fn cast_rest_f32(batch: &RecordBatch, except: &[&str]) -> Result<RecordBatch> {
    let mut out = batch.clone();
    for idx in 0..out.num_columns() {
        let name = out.schema().field(idx).name().clone();
        if except.contains(&name.as_str()) {
            continue;
        }
        let cast = compute::cast(out.column(idx), &DataType::Float32)?;
        out = replace_column(&out, idx, cast)?;
    }
    Ok(out)
}

/// Append `dst = src - offset` as a new trailing column (re-zeroing ordinal
/// codes). The source column is left in place for the caller to drop.
pub fn shift_column(batch: &RecordBatch, src: &str, dst: &str, offset: f64) -> Result<RecordBatch> {
    let idx = index_of(batch, src)?;
    let col = compute::cast(batch.column(idx), &DataType::Float64)?;
    let shift = Scalar::new(Float64Array::from(vec![offset]));
    let shifted = numeric::sub(&col, &shift)?;
    append_column(batch, dst, shifted)
}

/// Reorder so the named columns come last, in the given order.
pub fn move_to_end(batch: &RecordBatch, names: &[&str]) -> Result<RecordBatch> {
    let mut order: Vec<usize> = batch
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| !names.contains(&f.name().as_str()))
        .map(|(i, _)| i)
        .collect();
    for name in names {
        order.push(index_of(batch, name)?);
    }
    Ok(batch.project(&order)?)
}
