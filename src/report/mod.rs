pub mod excel;
pub mod pdf;

use actix_web::{http::header, HttpResponse};
use std::collections::HashMap;
use std::hash::Hash;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A generated document, sent back as an attachment.
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn pdf<S: Into<String>>(filename: S, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: PDF_CONTENT_TYPE,
            bytes,
        }
    }

    pub fn xlsx<S: Into<String>>(filename: S, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: XLSX_CONTENT_TYPE,
            bytes,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::Ok()
            .content_type(self.content_type)
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .body(self.bytes)
    }
}

/// Most frequent value; on a tie the value seen first wins.
pub fn most_common<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (index, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, index)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}

pub fn most_common_or_na<I>(values: I) -> String
where
    I: IntoIterator<Item = String>,
{
    most_common(values).unwrap_or_else(|| "N/A".to_string())
}

/// `1234.5` -> `$1,234.50`
pub fn format_money(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let (units, cents) = (cents / 100, cents % 100);

    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}.{:02}", if negative { "-" } else { "" }, grouped, cents)
}

/// Day-first date used in printed listings.
pub fn format_display_date(date: &chrono::NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Display codes such as `P001` or `HC012`.
pub fn format_code(prefix: &str, id: u64) -> String {
    format!("{}{:03}", prefix, id)
}

pub const PATIENT_CODE: &str = "P";
pub const APPOINTMENT_CODE: &str = "C";
pub const HISTORY_CODE: &str = "HC";
pub const INVOICE_CODE: &str = "F";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_common_breaks_ties_by_first_seen() {
        assert_eq!(most_common(vec!["b", "a", "a", "b"]), Some("b"));
        assert_eq!(most_common(vec!["b", "a", "a"]), Some("a"));
        assert_eq!(most_common(Vec::<&str>::new()), None);
        assert_eq!(most_common_or_na(Vec::new()), "N/A");
    }

    #[test]
    fn money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(1234.56), "$1,234.56");
        assert_eq!(format_money(1234567.891), "$1,234,567.89");
        assert_eq!(format_money(999.999), "$1,000.00");
        assert_eq!(format_money(-50.5), "-$50.50");
    }

    #[test]
    fn codes() {
        assert_eq!(format_code(PATIENT_CODE, 1), "P001");
        assert_eq!(format_code(APPOINTMENT_CODE, 7), "C007");
        assert_eq!(format_code(HISTORY_CODE, 12), "HC012");
        assert_eq!(format_code(INVOICE_CODE, 1234), "F1234");
    }

    #[test]
    fn display_dates_are_day_first() {
        let date = chrono::NaiveDate::from_ymd(2025, 3, 4);
        assert_eq!(format_display_date(&date), "04/03/2025");
    }

    #[test]
    fn attachment_headers() {
        let res = ExportFile::pdf("pacientes.pdf", b"%PDF".to_vec()).into_response();
        let disposition = res
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(disposition, "attachment; filename=\"pacientes.pdf\"");
    }
}
