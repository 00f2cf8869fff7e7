//! Letter-sized PDF reports drawn with the builtin Helvetica faces.
//!
//! Layout is a single cursor moving down the page; anything that would cross
//! the bottom margin starts a new page. Every page carries the generated-at
//! footer, and tables repeat their column header after a page break.

use anyhow::anyhow;
use chrono::Local;
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};

const LETTER_SHORT: f32 = 215.9;
const LETTER_LONG: f32 = 279.4;
const MARGIN: f32 = 12.0;
const FOOTER_Y: f32 = 8.0;

const TITLE_SIZE: f32 = 15.0;
const HEADING_SIZE: f32 = 11.0;
const TEXT_SIZE: f32 = 9.0;
const TABLE_SIZE: f32 = 8.0;

/// Rough Helvetica advance per character at 1pt, in mm.
const CHAR_WIDTH_PER_PT: f32 = 0.19;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Orientation {
    Portrait,
    Landscape,
}

pub struct Column {
    pub title: &'static str,
    pub width: f32,
}

impl Column {
    pub const fn new(title: &'static str, width: f32) -> Self {
        Self { title, width }
    }
}

pub struct PdfReport {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    width: f32,
    height: f32,
    y: f32,
    pages: usize,
    footer: String,
}

impl PdfReport {
    /// Opens the document and draws the report header on the first page.
    pub fn new(
        company: &str,
        title: &str,
        subtitle: Option<&str>,
        orientation: Orientation,
    ) -> anyhow::Result<Self> {
        let (width, height) = match orientation {
            Orientation::Portrait => (LETTER_SHORT, LETTER_LONG),
            Orientation::Landscape => (LETTER_LONG, LETTER_SHORT),
        };
        let (doc, page, layer) = PdfDocument::new(title, Mm(width), Mm(height), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("PDF font error: {:?}", e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("PDF font error: {:?}", e))?;

        let mut report = Self {
            doc,
            layer,
            regular,
            bold,
            width,
            height,
            y: height - MARGIN,
            pages: 1,
            footer: format!("Generated on {}", Local::now().format("%d/%m/%Y %H:%M")),
        };
        report.draw_footer();

        report.y -= 2.0;
        report.text(company, HEADING_SIZE, MARGIN, true);
        report.y -= 7.0;
        report.text(title, TITLE_SIZE, MARGIN, true);
        report.y -= 6.0;
        if let Some(subtitle) = subtitle {
            report.text(subtitle, TEXT_SIZE, MARGIN, false);
            report.y -= 4.0;
        }
        report.rule();
        report.y -= 6.0;

        Ok(report)
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    pub fn heading(&mut self, text: &str) {
        self.ensure_space(12.0);
        self.y -= 2.0;
        self.text(text, HEADING_SIZE, MARGIN, true);
        self.y -= 6.0;
    }

    /// Two-column `label: value` table.
    pub fn stats(&mut self, rows: &[(&str, String)]) {
        for (label, value) in rows {
            self.ensure_space(5.0);
            self.text(label, TEXT_SIZE, MARGIN + 2.0, true);
            self.text(value, TEXT_SIZE, MARGIN + 70.0, false);
            self.y -= 5.0;
        }
        self.y -= 3.0;
    }

    pub fn table(&mut self, columns: &[Column], rows: &[Vec<String>]) {
        self.ensure_space(12.0);
        self.table_header(columns);
        for row in rows {
            if self.y - 4.5 < MARGIN + FOOTER_Y {
                self.page_break();
                self.table_header(columns);
            }
            let mut x = MARGIN;
            for (column, cell) in columns.iter().zip(row.iter()) {
                let cell = truncate(cell, max_chars(column.width, TABLE_SIZE));
                self.text(&cell, TABLE_SIZE, x + 1.0, false);
                x += column.width;
            }
            self.y -= 4.5;
        }
        self.y -= 4.0;
    }

    /// A bold label followed by wrapped text.
    pub fn paragraph(&mut self, label: &str, text: &str) {
        self.ensure_space(10.0);
        self.text(label, TEXT_SIZE, MARGIN, true);
        self.y -= 5.0;
        let text = if text.trim().is_empty() { "-" } else { text };
        for line in wrap_text(text, max_chars(self.width - 2.0 * MARGIN - 4.0, TEXT_SIZE)) {
            self.ensure_space(4.5);
            self.text(&line, TEXT_SIZE, MARGIN + 4.0, false);
            self.y -= 4.5;
        }
        self.y -= 3.0;
    }

    pub fn page_break(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(self.width), Mm(self.height), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
        self.y = self.height - MARGIN;
        self.draw_footer();
    }

    pub fn finish(self) -> anyhow::Result<Vec<u8>> {
        log::debug!("rendered PDF report with {} page(s)", self.page_count());
        self.doc
            .save_to_bytes()
            .map_err(|e| anyhow!("PDF save error: {:?}", e))
    }

    fn table_header(&mut self, columns: &[Column]) {
        let mut x = MARGIN;
        for column in columns {
            self.text(column.title, TABLE_SIZE, x + 1.0, true);
            x += column.width;
        }
        self.y -= 1.5;
        self.rule();
        self.y -= 4.0;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed < MARGIN + FOOTER_Y {
            self.page_break();
        }
    }

    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn rule(&self) {
        let line = Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(self.y)), false),
                (Point::new(Mm(self.width - MARGIN), Mm(self.y)), false),
            ],
            is_closed: false,
        };
        self.layer.add_line(line);
    }

    fn draw_footer(&self) {
        let text = format!("{}  -  page {}", self.footer, self.pages);
        self.layer
            .use_text(text, 7.0, Mm(MARGIN), Mm(FOOTER_Y), &self.regular);
    }
}

fn max_chars(width: f32, size: f32) -> usize {
    ((width - 2.0) / (size * CHAR_WIDTH_PER_PT)).max(1.0) as usize
}

/// Cuts `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut cut: String = text.chars().take(max - 3).collect();
    cut.push_str("...");
    cut
}

pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for source_line in text.lines() {
        let mut current = String::new();
        for word in source_line.split_whitespace() {
            let needed = current.chars().count() + word.chars().count() + 1;
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_renders_pdf_bytes() {
        let mut report =
            PdfReport::new("Clinica Demo", "Patients", Some("All records"), Orientation::Portrait)
                .unwrap();
        report.heading("Statistics");
        report.stats(&[("Total:", "2".to_string())]);
        report.table(
            &[Column::new("ID", 20.0), Column::new("Name", 60.0)],
            &[
                vec!["P001".to_string(), "Ana Perez".to_string()],
                vec!["P002".to_string(), "Luis Gomez".to_string()],
            ],
        );
        report.paragraph("Notes", "");
        let bytes = report.finish().unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn long_tables_spill_onto_new_pages() {
        let mut report =
            PdfReport::new("Clinica Demo", "Appointments", None, Orientation::Landscape).unwrap();
        let rows: Vec<Vec<String>> = (0..120)
            .map(|i| vec![format!("C{:03}", i), "x".repeat(200)])
            .collect();
        report.table(&[Column::new("ID", 20.0), Column::new("Reason", 80.0)], &rows);
        assert!(report.page_count() > 1);
        assert!(report.finish().is_ok());
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer value", 8), "a lon...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }

    #[test]
    fn wrapping() {
        let lines = wrap_text("one two three four five six", 10);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(wrap_text("", 10), vec![String::new()]);
        assert_eq!(wrap_text("a\nb", 10), vec!["a".to_string(), "b".to_string()]);
    }
}
