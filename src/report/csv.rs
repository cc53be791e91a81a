use crate::error::Result;
use crate::report::{row_cells, Cell, COLUMNS};
use crate::types::record::RepositoryRecord;
use std::path::Path;

pub fn write_csv(records: &[RepositoryRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COLUMNS)?;
    for record in records {
        let row: Vec<String> = row_cells(record).into_iter().map(cell_text).collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn cell_text(cell: Cell) -> String {
    match cell {
        Cell::Text(value) => value,
        Cell::Int(value) => value.to_string(),
        Cell::Float(value) => value.to_string(),
        Cell::Bool(value) => value.to_string(),
        Cell::Score(Some(value)) => value.to_string(),
        Cell::Score(None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn csv_flattens_list_fields() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("report.csv");
        let records = vec![RepositoryRecord {
            name: "tool".to_string(),
            org: "acme".to_string(),
            full_name: "acme/tool".to_string(),
            code_types: vec!["Rust".to_string(), "Shell".to_string()],
            quality_score: Some(64),
            ..Default::default()
        }];

        write_csv(&records, &path).expect("csv should write");
        let content = std::fs::read_to_string(&path).expect("csv should read back");

        let mut lines = content.lines();
        let header = lines.next().expect("header line should exist");
        assert!(header.starts_with("name,org,full_name"));
        let row = lines.next().expect("data line should exist");
        assert!(row.contains("\"Rust, Shell\""));
        assert!(row.contains("64"));
    }

    #[test]
    fn csv_header_matches_column_count() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("report.csv");
        write_csv(&[RepositoryRecord::default()], &path).expect("csv should write");

        let content = std::fs::read_to_string(&path).expect("csv should read back");
        let header = content.lines().next().expect("header line should exist");
        assert_eq!(header.split(',').count(), COLUMNS.len());
    }
}
