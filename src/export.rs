//! CSV serialization of a price table.

use crate::provider::{Cell, PriceTable};

/// Serialize the table to CSV bytes, date index first. Expects columns to be
/// flattened already; hierarchical keys are ignored here either way.
pub fn to_csv(table: &PriceTable) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = Vec::with_capacity(table.columns.len() + 1);
    header.push("Date".to_string());
    header.extend(table.columns.iter().map(|c| c.field.clone()));
    writer.write_record(&header)?;

    let mut record = Vec::with_capacity(header.len());
    for row in &table.rows {
        record.clear();
        record.push(row.date.format("%Y-%m-%d").to_string());
        for cell in &row.cells {
            record.push(match cell {
                Cell::Float(v) => v.to_string(),
                Cell::Int(v) => v.to_string(),
                Cell::Empty => String::new(),
            });
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))
}
