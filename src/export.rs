use crate::error::ExportError;
use crate::schema::Dataset;
use std::io::Write;

/// Write `view` as UTF-8 CSV with a header row. Missing values are empty cells.
pub fn write_csv<W: Write>(view: &Dataset, writer: W) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&view.columns)?;
    for record in &view.records {
        out.write_record(record.values.iter().map(|v| v.to_string()))?;
    }
    out.flush()?;
    Ok(())
}

/// The filtered view as CSV bytes, ready for download.
pub fn to_csv_bytes(view: &Dataset) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_reader::read_csv;
    use crate::schema::normalize;

    #[test]
    fn test_export_format() {
        let input = "Firm Name,Name,Year Joined\n\"A, Inc\",Jo,2020\nB,Al,oops\n";
        let ds = normalize(read_csv(input.as_bytes()).unwrap());
        let bytes = to_csv_bytes(&ds).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("Firm Name,Name,Year Joined,Title,"));
        assert!(lines.next().unwrap().starts_with("\"A, Inc\",Jo,2020,,Other,"));
        assert!(lines.next().unwrap().starts_with("B,Al,,,Other,"));
    }

    #[test]
    fn test_round_trip() {
        let input = "Name,Notes,Year Joined,Current Office\nJo,\"multi\nline\",2019.0,\nAl,,x, Paris \n";
        let ds = normalize(read_csv(input.as_bytes()).unwrap());
        let bytes = to_csv_bytes(&ds).unwrap();
        let again = normalize(read_csv(bytes.as_slice()).unwrap());
        assert!(again.content_eq(&ds));
    }

    #[test]
    fn test_export_empty_view_keeps_header() {
        let ds = normalize(read_csv("Firm Name\nA\n".as_bytes()).unwrap()).with_records(vec![]);
        let text = String::from_utf8(to_csv_bytes(&ds).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
