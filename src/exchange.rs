use std::io::{Read, Write};

use crate::error::Result;
use crate::models::{Field, TransactionRecord};

/// Write records as CSV: a header of field keys, then one row per record.
pub fn write_records<W: Write>(writer: W, records: &[TransactionRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(Field::ALL.iter().map(|f| f.key()))?;
    for record in records {
        wtr.write_record(Field::ALL.iter().map(|f| record.text(*f)))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read records written by [`write_records`]. Columns are matched by header
/// name, so order does not matter; unknown columns are ignored and missing
/// ones stay empty.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns: Vec<Option<Field>> = rdr.headers()?.iter().map(Field::from_key).collect();

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let mut record = TransactionRecord::default();
        for (value, field) in row.iter().zip(&columns) {
            if let Some(field) = field {
                record.set(*field, value);
            }
        }
        records.push(record);
    }
    tracing::debug!(count = records.len(), "read records from csv");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FormValue;
    use crate::resolver::on_field_change;

    fn kw_sale() -> TransactionRecord {
        let r = TransactionRecord::blank();
        let r = on_field_change(&r, Field::Brokerage, "KW");
        let r = on_field_change(&r, Field::ClientName, "Lee, Jordan");
        let r = on_field_change(&r, Field::ClosedPrice, "1,000,000");
        on_field_change(&r, Field::CommissionPct, "3")
    }

    #[test]
    fn test_csv_round_trip() {
        let mut other = TransactionRecord::blank();
        other.notes = FormValue::from("line one\nline \"two\"");
        let records = vec![kw_sale(), other];

        let mut buf = Vec::new();
        write_records(&mut buf, &records).unwrap();
        let back = read_records(buf.as_slice()).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_header_lists_every_field() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("clientName,propertyAddress"));
        assert!(header.ends_with("nci,netVolume"));
    }

    #[test]
    fn test_read_tolerates_partial_columns() {
        let csv = "closedPrice,brokerage,spreadsheetRow\n500000,BDH,7\n";
        let records = read_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].closed_price.as_str(), "500000");
        assert!(records[0].commission_pct.is_blank());
    }
}
