//! # Quote PDF
//!
//! Renders the customer quote to a printable PDF using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Quote data is injected via `{{PLACEHOLDER}}` substitution before
//!   compilation; all operator text is escaped first
//! - Fonts come from `typst-assets`, so no system fonts are needed
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::Local;
//! use estimator_core::estimate::Estimate;
//! use estimator_core::pdf::render_quote_pdf;
//! use estimator_core::quote::Quote;
//!
//! let quote = Quote::from_estimate(&Estimate::starter(), Local::now().date_naive());
//! let pdf_bytes = render_quote_pdf(&quote).unwrap();
//! std::fs::write("quote.pdf", pdf_bytes).unwrap();
//! ```

use chrono::{Datelike, Local};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::errors::{EstimateError, EstimateResult};
use crate::estimate::Contact;
use crate::money::{format_money, format_quantity};
use crate::quote::{Quote, QuoteSection};

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A minimal Typst world for compiling one in-memory document.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    fn load_fonts() -> Vec<Font> {
        let mut fonts = Vec::new();
        for font_bytes in typst_assets::fonts() {
            let buffer = Bytes::new(font_bytes.to_vec());
            for font in Font::iter(buffer) {
                fonts.push(font);
            }
        }
        fonts
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Local::now();
        Datetime::from_ymd(now.year(), now.month() as u8, now.day() as u8)
    }
}

// ============================================================================
// Template
// ============================================================================

const QUOTE_TEMPLATE: &str = r##"
#set page(
  paper: "us-letter",
  margin: (top: 0.9in, bottom: 0.9in, left: 0.9in, right: 0.9in),
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr),
      align(left)[#text(size: 9pt)[{{TITLE}}]],
      align(right)[#text(size: 9pt)[Page #counter(page).display()]],
    )
  ]
)

#set text(size: 11pt)

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 14pt, radius: 4pt)[
    #text(size: 20pt, weight: "bold")[Quote]
    #v(4pt)
    #text(size: 13pt)[{{TITLE}}]
    #v(2pt)
    #text(size: 10pt)[{{DATE}}]
  ]
]

#v(12pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 20pt,
  [
    *From*
    #v(4pt)
    {{COMPANY}}
  ],
  [
    *Prepared for*
    #v(4pt)
    {{CUSTOMER}}
  ]
)

#v(12pt)

{{SECTIONS}}

#v(16pt)
#align(right)[
  #block(fill: rgb("#e8f4ea"), inset: 12pt, radius: 4pt)[
    #text(size: 14pt, weight: "bold")[Total: {{GRAND_TOTAL}}]
  ]
]

{{NOTES}}
"##;

// ============================================================================
// Rendering
// ============================================================================

/// Render a quote to PDF bytes.
pub fn render_quote_pdf(quote: &Quote) -> EstimateResult<Vec<u8>> {
    let notes = match &quote.notes {
        Some(notes) => format!("#v(16pt)\n*Notes*\n\n{}", escape_typst(notes)),
        None => String::new(),
    };

    let sections: String = quote.sections().iter().map(|s| build_section(s)).collect();

    let source = QUOTE_TEMPLATE
        .replace("{{TITLE}}", &escape_typst(&quote.title))
        .replace("{{DATE}}", &quote.date.format("%B %-d, %Y").to_string())
        .replace("{{COMPANY}}", &contact_block(&quote.company))
        .replace("{{CUSTOMER}}", &contact_block(&quote.customer))
        .replace("{{SECTIONS}}", &sections)
        .replace("{{GRAND_TOTAL}}", &escape_typst(&format_money(quote.grand_total)))
        .replace("{{NOTES}}", &notes);

    compile_pdf(source)
}

fn compile_pdf(source: String) -> EstimateResult<Vec<u8>> {
    let world = PdfWorld::new(source);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        EstimateError::Internal {
            message: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        EstimateError::Internal {
            message: format!("PDF rendering failed: {}", error_msgs.join("; ")),
        }
    })
}

fn build_section(section: &QuoteSection) -> String {
    let rows: String = section
        .lines
        .iter()
        .map(|line| {
            format!(
                "  [{}], [{}], [{}], [{}], [{}],\n",
                escape_typst(&line.label),
                format_quantity(line.quantity),
                escape_typst(&line.unit),
                escape_typst(&format_money(line.rate)),
                escape_typst(&format_money(line.line_total)),
            )
        })
        .collect();

    format!(
        r##"
== {title}

#table(
  columns: (1fr, auto, auto, auto, auto),
  inset: 7pt,
  stroke: 0.5pt,
  align: (left, right, left, right, right),
  table.header([*Item*], [*Qty*], [*Unit*], [*Rate*], [*Total*]),
{rows}  table.cell(colspan: 4, align: right)[*Subtotal*], [*{subtotal}*],
)

#v(8pt)
"##,
        title = escape_typst(&section.title),
        rows = rows,
        subtotal = escape_typst(&format_money(section.subtotal)),
    )
}

fn contact_block(contact: &Contact) -> String {
    let lines: Vec<String> = [&contact.name, &contact.address, &contact.phone, &contact.email]
        .into_iter()
        .filter(|field| !field.is_empty())
        .map(|field| escape_typst(field))
        .collect();

    if lines.is_empty() {
        "-".to_string()
    } else {
        lines.join(" \\\n    ")
    }
}

/// Escape user-provided text for Typst markup.
///
/// Each line keeps its break, and a line starting with a list marker
/// (`-`, `+`, `1.`) stays plain text.
fn escape_typst(s: &str) -> String {
    s.lines().map(escape_line).collect::<Vec<_>>().join(" \\\n")
}

fn escape_line(line: &str) -> String {
    let body = line.trim_start();
    let mut escaped = line[..line.len() - body.len()].to_string();

    let digits = body.chars().take_while(|c| c.is_ascii_digit()).count();
    if body.starts_with(['-', '+']) {
        escaped.push('\\');
        escaped.push_str(&escape_chars(body));
    } else if digits > 0 && body[digits..].starts_with('.') {
        escaped.push_str(&body[..digits]);
        escaped.push('\\');
        escaped.push_str(&escape_chars(&body[digits..]));
    } else {
        escaped.push_str(&escape_chars(body));
    }
    escaped
}

fn escape_chars(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '=' => "\\=".to_string(),
            '/' => "\\/".to_string(),
            '~' => "\\~".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::Estimate;
    use chrono::NaiveDate;

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("$1,050.00"), "\\$1,050.00");
        assert_eq!(escape_typst("Trim [front] #2"), "Trim \\[front\\] \\#2");
        assert_eq!(escape_typst("plain"), "plain");
    }

    #[test]
    fn test_escape_list_markers_and_lines() {
        assert_eq!(escape_typst("- hang lights"), "\\- hang lights");
        assert_eq!(escape_typst("  + extra timer"), "  \\+ extra timer");
        assert_eq!(escape_typst("1. front yard"), "1\\. front yard");
        assert_eq!(escape_typst("Call 555-0100"), "Call 555-0100");
        assert_eq!(escape_typst("12 strands"), "12 strands");
        assert_eq!(escape_typst("Gate code\r\n- 4471"), "Gate code \\\n\\- 4471");
        assert_eq!(escape_typst(""), "");
    }

    #[test]
    fn test_quote_pdf_with_multiline_notes() {
        let mut estimate = Estimate::starter();
        estimate.notes = "Before install:\n- clear gutters\n1. test outlets\n+ buy timer".to_string();
        estimate.linear[0].label = "- Roofline".to_string();
        let quote = Quote::from_estimate(&estimate, NaiveDate::from_ymd_opt(2025, 11, 28).unwrap());

        let pdf = render_quote_pdf(&quote);
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());
    }

    #[test]
    fn test_contact_block() {
        assert_eq!(contact_block(&Contact::default()), "-");

        let contact = Contact {
            name: "Bright Nights".to_string(),
            phone: "555-0100".to_string(),
            ..Contact::default()
        };
        assert_eq!(contact_block(&contact), "Bright Nights \\\n    555-0100");
    }

    #[test]
    fn test_quote_pdf_generation() {
        let mut estimate = Estimate::starter();
        estimate.customer.name = "Pat Rivera".to_string();
        estimate.notes = "Ladder access from the *north* side #gate".to_string();
        let quote = Quote::from_estimate(&estimate, NaiveDate::from_ymd_opt(2025, 11, 28).unwrap());

        let pdf = render_quote_pdf(&quote);
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }
}
