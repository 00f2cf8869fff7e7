use rust_xlsxwriter::{Format, Workbook};

pub enum Cell {
    Text(String),
    Number(f64),
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Number(n as f64)
    }
}

/// Writes a one-sheet workbook: bold header row, then one row per record.
pub fn build_sheet(sheet_name: &str, headers: &[&str], rows: Vec<Vec<Cell>>) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
        sheet.set_column_width(col as u16, (header.chars().count() + 6).max(14) as f64)?;
    }

    for (row, cells) in rows.into_iter().enumerate() {
        let row = row as u32 + 1;
        for (col, cell) in cells.into_iter().enumerate() {
            match cell {
                Cell::Text(s) => sheet.write_string(row, col as u16, &s)?,
                Cell::Number(n) => sheet.write_number(row, col as u16, n)?,
            };
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_is_a_zip_container() {
        let bytes = build_sheet(
            "Pacientes",
            &["ID", "Name", "Age"],
            vec![vec!["P001".into(), "Ana Perez".into(), Cell::Number(34.0)]],
        )
        .unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn invalid_sheet_name_is_an_error() {
        assert!(build_sheet("bad[name]", &["ID"], vec![]).is_err());
    }
}
