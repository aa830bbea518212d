//! Text → PDF rendering via flowpdf.
//!
//! ## Why spawn_blocking?
//!
//! Layout and serialisation are synchronous CPU and file work. Running them
//! on Tokio's blocking pool keeps the runtime's worker threads free while a
//! large text is laid out.
//!
//! The page setup is fixed: portrait A4, Times-Roman 12 pt, 5 mm lines,
//! 10 mm margins and an automatic page break 20 mm above the bottom edge.
//! The whole text goes into one flowing cell; flowpdf decides where lines
//! wrap and pages end.

use crate::error::RenderError;
use flowpdf::{Document, Font};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const FONT: Font = Font::TimesRoman;
pub const FONT_SIZE_PT: f64 = 12.0;
pub const LINE_HEIGHT_MM: f64 = 5.0;
pub const PAGE_BREAK_MARGIN_MM: f64 = 20.0;

/// Lay `text` out on as many pages as it needs. Empty text yields one
/// blank page.
pub fn layout(text: &str) -> Result<Document, RenderError> {
    let mut doc = Document::new();
    doc.set_page_break_margin(PAGE_BREAK_MARGIN_MM);
    doc.add_page();
    doc.set_font(FONT, FONT_SIZE_PT);
    doc.multi_cell(0.0, LINE_HEIGHT_MM, text)?;
    debug!("Laid out {} chars on {} pages", text.len(), doc.page_count());
    Ok(doc)
}

/// Render `text` as a PDF into `sink`.
pub fn render_pdf<W: Write>(text: &str, sink: &mut W) -> Result<(), RenderError> {
    layout(text)?.write_to(sink)?;
    Ok(())
}

/// Render `text` into the file at `path`, replacing its contents.
pub async fn render_to_file(text: String, path: &Path) -> Result<(), RenderError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || render_to_file_blocking(&text, path))
        .await
        .map_err(|e| RenderError::Aborted(e.to_string()))?
}

fn render_to_file_blocking(text: &str, path: PathBuf) -> Result<(), RenderError> {
    let doc = layout(text)?;
    let file = File::create(&path).map_err(|source| RenderError::Io {
        path: path.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    doc.write_to(&mut writer).map_err(|e| match e {
        flowpdf::Error::Io(source) => RenderError::Io { path, source },
        other => RenderError::Layout(other),
    })
}
