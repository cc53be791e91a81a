use crate::error::Result;
use crate::report::{row_cells, Cell, COLUMNS};
use crate::types::record::RepositoryRecord;
use rust_xlsxwriter::{Table, TableColumn, TableStyle, Workbook};
use std::path::Path;

/// Write the records as a worksheet wrapped in an auto-filter table with
/// auto-fitted column widths.
pub fn write_xlsx(records: &[RepositoryRecord], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Repository Analysis")?;

    for (col, header) in COLUMNS.iter().enumerate() {
        worksheet.write(0, col as u16, *header)?;
    }
    for (row, record) in records.iter().enumerate() {
        let row = row as u32 + 1;
        for (col, cell) in row_cells(record).into_iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(value) => {
                    worksheet.write(row, col, value)?;
                }
                Cell::Int(value) => {
                    worksheet.write(row, col, value as f64)?;
                }
                Cell::Float(value) => {
                    worksheet.write(row, col, value)?;
                }
                Cell::Bool(value) => {
                    worksheet.write(row, col, value)?;
                }
                Cell::Score(Some(value)) => {
                    worksheet.write(row, col, value as f64)?;
                }
                Cell::Score(None) => {}
            }
        }
    }

    // Tables need at least one data row; a header-only sheet is still valid
    // output for an empty batch.
    if !records.is_empty() {
        let table_columns: Vec<TableColumn> = COLUMNS
            .iter()
            .map(|header| TableColumn::new().set_header(*header))
            .collect();
        let table = Table::new()
            .set_columns(&table_columns)
            .set_style(TableStyle::Medium9);
        worksheet.add_table(
            0,
            0,
            records.len() as u32,
            (COLUMNS.len() - 1) as u16,
            &table,
        )?;
    }

    worksheet.autofit();
    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn xlsx_file_is_written_for_records() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("report.xlsx");
        let records = vec![RepositoryRecord {
            name: "tool".to_string(),
            org: "acme".to_string(),
            full_name: "acme/tool".to_string(),
            total_commits: 12,
            quality_score: Some(55),
            ..Default::default()
        }];

        write_xlsx(&records, &path).expect("xlsx should write");
        let metadata = std::fs::metadata(&path).expect("xlsx file should exist");
        assert!(metadata.len() > 0);
    }

    #[test]
    fn xlsx_write_tolerates_empty_batch() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("empty.xlsx");
        write_xlsx(&[], &path).expect("empty xlsx should write");
        assert!(path.exists());
    }
}
