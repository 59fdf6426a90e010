// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Glue table definition templates.
//!
//! A template is a base table definition with a storage-format fragment
//! deep-merged on top of it. Caller overrides are deep-merged last.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use snafu::{OptionExt, ResultExt};

use crate::error::{CatalogError, CatalogResult, ConfigSnafu, JsonSnafu};

/// A JSON object, the shape of every Glue request fragment.
pub type Document = Map<String, Value>;

const BASE_TEMPLATE: &str = include_str!("../data/specs/base.json");
const CSV_TEMPLATE: &str = include_str!("../data/specs/csv_specific.json");
const PARQUET_TEMPLATE: &str = include_str!("../data/specs/parquet_specific.json");
const AVRO_TEMPLATE: &str = include_str!("../data/specs/avro_specific.json");
const ORC_TEMPLATE: &str = include_str!("../data/specs/orc_specific.json");

/// Storage formats with a table template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    Csv,
    Parquet,
    Avro,
    Orc,
}

impl DataFormat {
    pub const ALL: [DataFormat; 4] = [Self::Csv, Self::Parquet, Self::Avro, Self::Orc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
            Self::Avro => "avro",
            Self::Orc => "orc",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = CatalogError;

    /// Accepts `par` as shorthand for `parquet`. Case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "parquet" | "par" => Ok(Self::Parquet),
            "avro" => Ok(Self::Avro),
            "orc" => Ok(Self::Orc),
            other => Err(CatalogError::UnsupportedDataFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Recursively merge `overlay` into `base`.
///
/// Where both sides hold an object under the same key the objects are merged
/// key by key; any other value in `overlay` replaces the one in `base`.
pub fn deep_merge(base: &mut Document, overlay: &Document) {
    for (key, value) in overlay {
        if let (Some(Value::Object(existing)), Value::Object(incoming)) = (base.get_mut(key), value)
        {
            deep_merge(existing, incoming);
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}

/// The base template and one fragment per [`DataFormat`], parsed once.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    base: Document,
    fragments: HashMap<DataFormat, Document>,
}

impl TemplateSet {
    /// Templates packaged with this crate.
    pub fn bundled() -> CatalogResult<Self> {
        let mut fragments = HashMap::new();
        for (format, text) in [
            (DataFormat::Csv, CSV_TEMPLATE),
            (DataFormat::Parquet, PARQUET_TEMPLATE),
            (DataFormat::Avro, AVRO_TEMPLATE),
            (DataFormat::Orc, ORC_TEMPLATE),
        ] {
            let name = format!("{}_specific.json", format);
            fragments.insert(format, parse_document(&name, text)?);
        }
        Ok(Self {
            base: parse_document("base.json", BASE_TEMPLATE)?,
            fragments,
        })
    }

    pub fn new(base: Document, fragments: HashMap<DataFormat, Document>) -> Self {
        Self { base, fragments }
    }

    /// Template for `format_name` with `overrides` merged on top.
    pub fn get_template(&self, format_name: &str, overrides: &Document) -> CatalogResult<Document> {
        let format: DataFormat = format_name.parse()?;
        let mut template = self.template(format)?;
        deep_merge(&mut template, overrides);
        Ok(template)
    }

    pub fn template(&self, format: DataFormat) -> CatalogResult<Document> {
        let fragment = self
            .fragments
            .get(&format)
            .context(crate::error::UnsupportedDataFormatSnafu {
                format: format.as_str(),
            })?;
        let mut template = self.base.clone();
        deep_merge(&mut template, fragment);
        Ok(template)
    }
}

fn parse_document(name: &str, text: &str) -> CatalogResult<Document> {
    match serde_json::from_str(text).context(JsonSnafu { document: name })? {
        Value::Object(doc) => Ok(doc),
        _ => ConfigSnafu {
            message: format!("template {} is not a JSON object", name),
        }
        .fail(),
    }
}
