//! Service layer responsible for reading uploads and turning them into typed rows.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, warn};

use crate::common::error::{HearthError, HearthResult};

use super::domain::{
    Dataset, FeatureRecord, RawRecord, RawTable, TrainingRow, AGE, AREA, BALCONY, BATH, BHK,
    FURNISHING, LOCATION, PARKING, PRICE, PROPERTY_TYPE, REQUIRED_COLUMNS,
};

/// Read a delimited upload with a header row into a raw table.
///
/// Only header names are trimmed. Cell text is kept as written, so category
/// labels must match exactly.
pub fn read_csv<R: Read>(reader: R) -> HearthResult<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| HearthError::Malformed(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    let mut table = RawTable::new(headers);

    for result in reader.records() {
        let record = result.map_err(|e| HearthError::Malformed(e.to_string()))?;
        let line = record.position().map_or(0, |pos| pos.line());
        table.push(line, record.iter().map(str::to_string).collect());
    }

    debug!(rows = table.len(), columns = table.headers.len(), "csv upload read");
    Ok(table)
}

/// Open a file on disk and read it as a named dataset (named after the file).
pub fn ingest_file(path: &Path) -> HearthResult<Dataset> {
    let file = File::open(path)
        .map_err(|e| HearthError::Malformed(format!("{}: {e}", path.display())))?;
    let table = read_csv(BufReader::new(file))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Dataset::new(name, table))
}

/// Check the header declares every required column. Returns the extra columns,
/// which training ignores.
pub fn validate_schema(headers: &[String]) -> HearthResult<Vec<String>> {
    let declared: HashSet<&str> = headers.iter().map(String::as_str).collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !declared.contains(*col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(HearthError::Schema { missing });
    }

    let extra: Vec<String> = headers
        .iter()
        .filter(|h| !REQUIRED_COLUMNS.contains(&h.as_str()))
        .cloned()
        .collect();
    if !extra.is_empty() {
        warn!(?extra, "ignoring columns outside the training schema");
    }
    Ok(extra)
}

/// Column positions resolved once per table.
struct Layout {
    location: usize,
    property_type: usize,
    area: usize,
    bhk: usize,
    bath: usize,
    balcony: usize,
    parking: usize,
    furnishing: usize,
    age: usize,
    price: usize,
}

impl Layout {
    fn resolve(table: &RawTable) -> HearthResult<Self> {
        let mut missing = Vec::new();
        let mut idx = |name: &str| match table.column_index(name) {
            Some(i) => i,
            None => {
                missing.push(name.to_string());
                0
            }
        };
        let layout = Self {
            location: idx(LOCATION),
            property_type: idx(PROPERTY_TYPE),
            area: idx(AREA),
            bhk: idx(BHK),
            bath: idx(BATH),
            balcony: idx(BALCONY),
            parking: idx(PARKING),
            furnishing: idx(FURNISHING),
            age: idx(AGE),
            price: idx(PRICE),
        };
        if missing.is_empty() {
            Ok(layout)
        } else {
            Err(HearthError::Schema { missing })
        }
    }
}

/// Parse every record of a validated table into typed training rows.
pub fn parse_rows(table: &RawTable) -> HearthResult<Vec<TrainingRow>> {
    let layout = Layout::resolve(table)?;
    table.records.iter().map(|r| parse_row(&layout, r)).collect()
}

fn parse_row(layout: &Layout, record: &RawRecord) -> HearthResult<TrainingRow> {
    let cell = |idx: usize| record.fields.get(idx).map(String::as_str).unwrap_or("");
    let category = |idx: usize| Some(cell(idx)).filter(|v| !v.is_empty()).map(str::to_string);

    let features = FeatureRecord {
        location: category(layout.location),
        property_type: category(layout.property_type),
        area: parse_positive(record.line, AREA, cell(layout.area))?,
        bhk: parse_count(record.line, BHK, cell(layout.bhk))?,
        bath: parse_count(record.line, BATH, cell(layout.bath))?,
        balcony: parse_count(record.line, BALCONY, cell(layout.balcony))?,
        parking: parse_count(record.line, PARKING, cell(layout.parking))?,
        furnishing: category(layout.furnishing),
        age: parse_count(record.line, AGE, cell(layout.age))?,
    };
    let price = parse_positive(record.line, PRICE, cell(layout.price))?;

    Ok(TrainingRow { features, price })
}

fn invalid(line: u64, column: &str, value: &str) -> HearthError {
    HearthError::InvalidValue {
        line,
        column: column.to_string(),
        value: value.to_string(),
    }
}

/// Finite and strictly positive: areas and prices.
fn parse_positive(line: u64, column: &str, value: &str) -> HearthResult<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| invalid(line, column, value))
}

/// Small non-negative integers; spreadsheet exports often write `3.0`.
fn parse_count(line: u64, column: &str, value: &str) -> HearthResult<u32> {
    let trimmed = value.trim();
    if let Ok(v) = trimmed.parse::<u32>() {
        return Ok(v);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => {
            Ok(v as u32)
        }
        _ => Err(invalid(line, column, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "location,property_type,area,bhk,bath,balcony,parking,furnishing,age,price";

    #[test]
    fn reads_and_parses_rows() {
        let csv = format!(
            "{HEADER}\nWhitefield,Apartment,1200,2,2,1,1,Semi-Furnished,5,85.5\nHebbal,Villa,2400.5,4,3.0,2,2,,12,310\n"
        );
        let table = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].line, 2);

        let rows = parse_rows(&table).unwrap();
        assert_eq!(rows[0].features.location.as_deref(), Some("Whitefield"));
        assert_eq!(rows[0].features.furnishing.as_deref(), Some("Semi-Furnished"));
        assert_eq!(rows[1].features.bath, 3);
        assert_eq!(rows[1].features.furnishing, None);
        assert!((rows[1].price - 310.0).abs() < 1e-9);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let headers: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| **c != AREA)
            .map(|c| c.to_string())
            .collect();
        match validate_schema(&headers) {
            Err(HearthError::Schema { missing }) => assert_eq!(missing, vec!["area".to_string()]),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn extra_columns_are_reported_not_rejected() {
        let mut headers: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        headers.push("listing_id".to_string());
        assert_eq!(validate_schema(&headers).unwrap(), vec!["listing_id".to_string()]);
    }

    #[test]
    fn column_order_in_upload_does_not_matter() {
        let csv = "price,age,furnishing,parking,balcony,bath,bhk,area,property_type,location\n120,3,Unfurnished,1,0,1,1,650,Apartment,Indiranagar\n";
        let rows = parse_rows(&read_csv(csv.as_bytes()).unwrap()).unwrap();
        assert_eq!(rows[0].features.location.as_deref(), Some("Indiranagar"));
        assert!((rows[0].features.area - 650.0).abs() < 1e-9);
        assert!((rows[0].price - 120.0).abs() < 1e-9);
    }

    #[test]
    fn non_numeric_area_names_line_and_column() {
        let csv = format!("{HEADER}\nWhitefield,Apartment,big,2,2,1,1,Semi-Furnished,5,85.5\n");
        let err = parse_rows(&read_csv(csv.as_bytes()).unwrap()).unwrap_err();
        assert_eq!(
            err,
            HearthError::InvalidValue {
                line: 2,
                column: "area".into(),
                value: "big".into()
            }
        );
    }

    #[test]
    fn negative_counts_are_rejected() {
        let csv = format!("{HEADER}\nWhitefield,Apartment,900,-1,2,1,1,Semi-Furnished,5,85.5\n");
        let err = parse_rows(&read_csv(csv.as_bytes()).unwrap()).unwrap_err();
        assert!(matches!(err, HearthError::InvalidValue { ref column, .. } if column == "bhk"));
    }

    #[test]
    fn blank_categories_are_missing() {
        let csv = format!("{HEADER}\n,,1200,2,2,1,1,,5,85.5\n");
        let rows = parse_rows(&read_csv(csv.as_bytes()).unwrap()).unwrap();
        assert_eq!(rows[0].features.location, None);
        assert_eq!(rows[0].features.property_type, None);
        assert_eq!(rows[0].features.furnishing, None);
    }

    #[test]
    fn line_numbers_follow_the_source_file() {
        let csv = format!(
            "{HEADER}\nWhitefield,Apartment,900,2,2,1,1,Semi-Furnished,5,85.5\n\nHebbal,Villa,huge,3,2,1,1,,2,200\n"
        );
        let err = parse_rows(&read_csv(csv.as_bytes()).unwrap()).unwrap_err();
        assert_eq!(
            err,
            HearthError::InvalidValue {
                line: 4,
                column: "area".into(),
                value: "huge".into()
            }
        );

        let quoted = format!(
            "{HEADER}\n\"White\nfield\",Apartment,900,2,2,1,1,,5,85.5\nHebbal,Villa,1800,x,2,1,1,,2,200\n"
        );
        let err = parse_rows(&read_csv(quoted.as_bytes()).unwrap()).unwrap_err();
        assert!(matches!(err, HearthError::InvalidValue { line: 4, .. }));
    }

    #[test]
    fn area_and_price_must_be_positive() {
        let cases = [
            ("0", "85.5", "area"),
            ("-40", "85.5", "area"),
            ("900", "0", "price"),
            ("900", "-1", "price"),
        ];
        for (area, price, column) in cases {
            let csv = format!("{HEADER}\nWhitefield,Apartment,{area},2,2,1,1,,5,{price}\n");
            let err = parse_rows(&read_csv(csv.as_bytes()).unwrap()).unwrap_err();
            assert!(
                matches!(err, HearthError::InvalidValue { column: ref c, .. } if c == column),
                "area={area} price={price}: {err:?}"
            );
        }
    }

    #[test]
    fn category_cells_keep_their_whitespace() {
        let csv = "location , property_type,area,bhk,bath,balcony,parking,furnishing,age,price\nWhitefield,Apartment, 900 ,2,2,1,1, Fully-Furnished,5,85.5\n";
        let rows = parse_rows(&read_csv(csv.as_bytes()).unwrap()).unwrap();
        assert_eq!(rows[0].features.furnishing.as_deref(), Some(" Fully-Furnished"));
        assert!((rows[0].features.area - 900.0).abs() < 1e-9);
    }

    #[test]
    fn ragged_records_are_malformed() {
        let csv = format!("{HEADER}\nWhitefield,Apartment\n");
        assert!(matches!(read_csv(csv.as_bytes()), Err(HearthError::Malformed(_))));
    }
}
