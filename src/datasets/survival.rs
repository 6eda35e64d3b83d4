//! The named datasets and their column transforms.
//!
//! All four come from the Rdatasets mirror of the R `survival` package;
//! flchain and nwtco resolve their URL through the master index, gbsg and
//! rotterdam download from fixed URLs. Expected checksums are the recorded
//! known-good values for the cached files.

use arrow::record_batch::RecordBatch;

use super::{Dataset, Source};
use crate::error::Result;
use crate::frame;

/// The R row-name column shows up with either an empty or a `rownames`
/// header depending on mirror vintage.
const INDEX_COLUMNS: &[&str] = &["", "rownames"];

fn drop_with_index(batch: &RecordBatch, extra: &[&str]) -> Result<RecordBatch> {
    let batch = frame::drop_columns(batch, INDEX_COLUMNS)?;
    frame::drop_columns(&batch, extra)
}

/// Assay of serum free light chain (flchain).
///
/// A study of the relationship between serum free light chain and mortality,
/// sampling roughly 2/3 of the residents of Olmsted County aged 50 or
/// greater. Duration is `futime` (days from enrollment until death), event is
/// `death` (0 = alive at last contact, 1 = dead).
pub fn flchain() -> Dataset {
    Dataset::new(
        "flchain",
        Source::Rdatasets {
            package: "survival",
            item: "flchain",
        },
        "ec12748a1aa5790457c09793387337bb03b1dc45a22a2d58a8c2b9ad1f2648dd",
        "futime",
        "death",
        transform_flchain,
    )
}

/// Drop the cause-of-death chapter, keep only rows with a creatinine
/// measurement, flag `sex` as male, encode `sample.yr`/`flc.grp` as
/// categoricals and cast the rest to f32.
fn transform_flchain(batch: RecordBatch) -> Result<RecordBatch> {
    let batch = drop_with_index(&batch, &["chapter"])?;
    let batch = frame::filter_not_null(&batch, "creatinine")?;
    let batch = frame::flag_equals(&batch, "sex", "M")?;
    let batch = frame::to_categorical(&batch, &["sample.yr", "flc.grp"])?;
    frame::cast_rest_f32(&batch, &["sample.yr", "flc.grp", "sex"])
}

/// Data from the National Wilm's Tumor Study (nwtco).
///
/// Measurement error example: tumor histology predicts survival, but
/// prediction is stronger with central lab histology than with the local
/// institution determination. Duration is `edrel` (time to relapse), event is
/// `rel` (relapse indicator).
pub fn nwtco() -> Dataset {
    Dataset::new(
        "nwtco",
        Source::Rdatasets {
            package: "survival",
            item: "nwtco",
        },
        "5aa3de698dadb60154dd59196796e382739ff56dc6cbd39cfc2fda50d69d118e",
        "edrel",
        "rel",
        transform_nwtco,
    )
}

/// Re-zero the ordinal codes (`instit`, `histol`, `study`), encode `stage` as
/// categorical, drop the originals plus the id column, cast to f32 and move
/// the duration/event columns last.
fn transform_nwtco(batch: RecordBatch) -> Result<RecordBatch> {
    let batch = frame::shift_column(&batch, "instit", "instit_2", 1.0)?;
    let batch = frame::shift_column(&batch, "histol", "histol_2", 1.0)?;
    let batch = frame::shift_column(&batch, "study", "study_4", 3.0)?;
    let batch = frame::to_categorical(&batch, &["stage"])?;
    let batch = drop_with_index(&batch, &["seqno", "instit", "histol", "study"])?;
    let batch = frame::cast_rest_f32(&batch, &["stage"])?;
    frame::move_to_end(&batch, &["edrel", "rel"])
}

/// German Breast Cancer Study Group trial (gbsg). Duration is `rfstime`,
/// event is `status`.
pub fn gbsg() -> Dataset {
    Dataset::new(
        "gbsg",
        Source::Direct(
            "https://raw.githubusercontent.com/vincentarelbundock/Rdatasets/master/csv/survival/gbsg.csv",
        ),
        "df5a80dded44f990c002e00cee6fd96eeaf4c6beb66e08b2f4f5a1710bc37ba4",
        "rfstime",
        "status",
        transform_gbsg,
    )
}

fn transform_gbsg(batch: RecordBatch) -> Result<RecordBatch> {
    drop_with_index(&batch, &["pid"])
}

/// Rotterdam tumor bank breast-cancer cohort (rotterdam). Duration is
/// `rtime`, event is `recur`; the alternative death endpoint is dropped by
/// the transform.
pub fn rotterdam() -> Dataset {
    Dataset::new(
        "rotterdam",
        Source::Direct(
            "https://raw.githubusercontent.com/vincentarelbundock/Rdatasets/master/csv/survival/rotterdam.csv",
        ),
        "7c30775ae615b0e56e6a5060413fa5bccd4716b199ac858fe84d26d7651a52a1",
        "rtime",
        "recur",
        transform_rotterdam,
    )
}

fn transform_rotterdam(batch: RecordBatch) -> Result<RecordBatch> {
    drop_with_index(&batch, &["pid", "year", "dtime", "death", "chemo"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{
        Array, BooleanArray, Float32Array, Float64Array, Int64Array, StringArray,
    };
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn field_names(batch: &RecordBatch) -> Vec<String> {
        batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    fn dict_utf8() -> DataType {
        DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8))
    }

    fn flchain_raw() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("rownames", DataType::Int64, true),
            Field::new("age", DataType::Int64, true),
            Field::new("sex", DataType::Utf8, true),
            Field::new("sample.yr", DataType::Int64, true),
            Field::new("kappa", DataType::Float64, true),
            Field::new("lambda", DataType::Float64, true),
            Field::new("flc.grp", DataType::Int64, true),
            Field::new("creatinine", DataType::Float64, true),
            Field::new("mgus", DataType::Int64, true),
            Field::new("futime", DataType::Int64, true),
            Field::new("death", DataType::Int64, true),
            Field::new("chapter", DataType::Utf8, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3])),
                Arc::new(Int64Array::from(vec![97, 92, 94])),
                Arc::new(StringArray::from(vec!["F", "M", "F"])),
                Arc::new(Int64Array::from(vec![1997, 2000, 1997])),
                Arc::new(Float64Array::from(vec![5.7, 0.87, 4.36])),
                Arc::new(Float64Array::from(vec![4.86, 0.68, 3.85])),
                Arc::new(Int64Array::from(vec![10, 1, 10])),
                Arc::new(Float64Array::from(vec![Some(1.7), None, Some(1.4)])),
                Arc::new(Int64Array::from(vec![0, 0, 1])),
                Arc::new(Int64Array::from(vec![85, 1281, 69])),
                Arc::new(Int64Array::from(vec![1, 1, 1])),
                Arc::new(StringArray::from(vec![
                    Some("Circulatory"),
                    Some("Neoplasms"),
                    None,
                ])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn flchain_processed_drops_missing_creatinine_and_flags_sex() {
        let out = transform_flchain(flchain_raw()).unwrap();
        let names = field_names(&out);
        assert!(!names.contains(&"rownames".to_string()));
        assert!(!names.contains(&"chapter".to_string()));

        // the row with a missing creatinine measurement is gone
        assert_eq!(out.num_rows(), 2);
        let creat_idx = out.schema().index_of("creatinine").unwrap();
        assert_eq!(out.column(creat_idx).null_count(), 0);

        let sex_idx = out.schema().index_of("sex").unwrap();
        assert_eq!(out.schema().field(sex_idx).data_type(), &DataType::Boolean);
        let sex = out
            .column(sex_idx)
            .as_any()
            .downcast_ref::<BooleanArray>()
            .unwrap();
        assert_eq!(
            sex.iter().collect::<Vec<_>>(),
            vec![Some(false), Some(false)]
        );

        for cat in ["sample.yr", "flc.grp"] {
            let idx = out.schema().index_of(cat).unwrap();
            assert_eq!(out.schema().field(idx).data_type(), &dict_utf8());
        }
        let age_idx = out.schema().index_of("age").unwrap();
        assert_eq!(out.schema().field(age_idx).data_type(), &DataType::Float32);
    }

    fn nwtco_raw() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("rownames", DataType::Int64, true),
            Field::new("seqno", DataType::Int64, true),
            Field::new("instit", DataType::Int64, true),
            Field::new("histol", DataType::Int64, true),
            Field::new("stage", DataType::Int64, true),
            Field::new("study", DataType::Int64, true),
            Field::new("rel", DataType::Int64, true),
            Field::new("edrel", DataType::Float64, true),
            Field::new("age", DataType::Int64, true),
            Field::new("in.subcohort", DataType::Boolean, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3])),
                Arc::new(Int64Array::from(vec![1, 2, 3])),
                Arc::new(Int64Array::from(vec![1, 2, 1])),
                Arc::new(Int64Array::from(vec![1, 2, 2])),
                Arc::new(Int64Array::from(vec![1, 4, 2])),
                Arc::new(Int64Array::from(vec![3, 4, 3])),
                Arc::new(Int64Array::from(vec![0, 1, 0])),
                Arc::new(Float64Array::from(vec![6075.0, 487.0, 2829.0])),
                Arc::new(Int64Array::from(vec![25, 50, 9])),
                Arc::new(BooleanArray::from(vec![false, true, false])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn nwtco_processed_rezeroes_codes_and_orders_labels_last() {
        let out = transform_nwtco(nwtco_raw()).unwrap();
        let names = field_names(&out);

        for gone in ["rownames", "seqno", "instit", "histol", "study"] {
            assert!(!names.contains(&gone.to_string()), "{gone} should be dropped");
        }
        assert_eq!(&names[names.len() - 2..], &["edrel", "rel"]);

        let stage_idx = out.schema().index_of("stage").unwrap();
        assert_eq!(out.schema().field(stage_idx).data_type(), &dict_utf8());

        // derived columns equal original - offset
        for (name, expected) in [
            ("instit_2", vec![0.0f32, 1.0, 0.0]),
            ("histol_2", vec![0.0, 1.0, 1.0]),
            ("study_4", vec![0.0, 1.0, 0.0]),
        ] {
            let idx = out.schema().index_of(name).unwrap();
            assert_eq!(out.schema().field(idx).data_type(), &DataType::Float32);
            let col = out
                .column(idx)
                .as_any()
                .downcast_ref::<Float32Array>()
                .unwrap();
            let got: Vec<f32> = col.iter().map(|v| v.unwrap()).collect();
            assert_eq!(got, expected, "{name}");
        }
    }

    fn id_batch(extra: &[&str]) -> RecordBatch {
        let mut fields = vec![Field::new("rownames", DataType::Int64, true)];
        fields.extend(
            extra
                .iter()
                .map(|name| Field::new(*name, DataType::Int64, true)),
        );
        let schema = Arc::new(Schema::new(fields));
        let columns: Vec<arrow::array::ArrayRef> = (0..schema.fields().len())
            .map(|_| Arc::new(Int64Array::from(vec![1, 2])) as arrow::array::ArrayRef)
            .collect();
        RecordBatch::try_new(schema, columns).unwrap()
    }

    #[test]
    fn gbsg_processed_drops_ids_only() {
        let raw = id_batch(&["pid", "rfstime", "status", "age"]);
        let out = transform_gbsg(raw).unwrap();
        assert_eq!(field_names(&out), vec!["rfstime", "status", "age"]);
        assert_eq!(out.num_rows(), 2);
    }

    #[test]
    fn rotterdam_processed_drops_alternative_endpoints() {
        let raw = id_batch(&[
            "pid", "year", "age", "rtime", "recur", "dtime", "death", "chemo",
        ]);
        let out = transform_rotterdam(raw).unwrap();
        assert_eq!(field_names(&out), vec!["age", "rtime", "recur"]);
    }
}
