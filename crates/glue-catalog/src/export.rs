// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Export of tabular data to object storage as CSV.

use arrow_array::RecordBatch;
use arrow_csv::WriterBuilder;
use snafu::ResultExt;
use tracing::info;

use crate::catalog_service::ObjectStorage;
use crate::error::{ArrowSnafu, CatalogResult};

/// CSV layout of an export.
///
/// Headers are off by default: catalog tables over CSV read every line as
/// data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvExportOptions {
    pub header: bool,
    pub delimiter: u8,
}

impl Default for CsvExportOptions {
    fn default() -> Self {
        Self {
            header: false,
            delimiter: b',',
        }
    }
}

/// Encode `batches` as one CSV document.
pub fn batches_to_csv(batches: &[RecordBatch], options: &CsvExportOptions) -> CatalogResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .with_header(options.header)
        .with_delimiter(options.delimiter)
        .build(Vec::new());
    for batch in batches {
        writer.write(batch).context(ArrowSnafu)?;
    }
    Ok(writer.into_inner())
}

/// Write `batches` as CSV to `bucket`/`key`, returning the number of bytes
/// uploaded.
pub async fn export_batches_to_csv(
    storage: &dyn ObjectStorage,
    batches: &[RecordBatch],
    bucket: &str,
    key: &str,
    options: &CsvExportOptions,
) -> CatalogResult<usize> {
    let body = batches_to_csv(batches, options)?;
    let size = body.len();
    storage.put_object(bucket, key, body).await?;
    let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
    info!(bucket, key, rows, size, "exported csv");
    Ok(size)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow_array::{Int64Array, StringArray};
    use arrow_schema::{DataType, Field, Schema};

    use super::*;

    fn people(ids: Vec<i64>, names: Vec<&str>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("name", DataType::Utf8, true),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(ids)),
                Arc::new(StringArray::from(names)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_csv_without_header() {
        let csv = batches_to_csv(
            &[people(vec![1, 2], vec!["Ann", "Bob"])],
            &CsvExportOptions::default(),
        )
        .unwrap();
        assert_eq!(String::from_utf8(csv).unwrap(), "1,Ann\n2,Bob\n");
    }

    #[test]
    fn test_csv_header_written_once() {
        let options = CsvExportOptions {
            header: true,
            delimiter: b'|',
        };
        let csv = batches_to_csv(
            &[people(vec![1], vec!["Ann"]), people(vec![2], vec!["Bob"])],
            &options,
        )
        .unwrap();
        assert_eq!(String::from_utf8(csv).unwrap(), "id|name\n1|Ann\n2|Bob\n");
    }
}
