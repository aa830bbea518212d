//! # flowpdf
//!
//! Flow plain text into fixed-size PDF pages.
//!
//! The crate covers exactly one layout primitive: a *flowing cell*. Text is
//! wrapped at spaces to the cell width, over-long words are broken where they
//! overflow, and a new page is started automatically whenever the next line
//! would cross the bottom break margin. Callers never paginate by hand.
//!
//! Text is set in the core-14 Times-Roman font (no embedding), encoded as
//! WinAnsi. Characters outside that code page are written as `?`.
//!
//! ## Usage
//!
//! ```rust
//! use flowpdf::{Document, Font};
//!
//! let mut doc = Document::new();
//! doc.add_page();
//! doc.set_font(Font::TimesRoman, 12.0);
//! doc.multi_cell(0.0, 5.0, "Hello World").unwrap();
//! let bytes = doc.to_bytes().unwrap();
//! assert!(bytes.starts_with(b"%PDF"));
//! ```
//!
//! ## Units
//!
//! Pages are A4 portrait. All positions and sizes passed to [`Document`]
//! are millimetres; font sizes are points. Margins are 10 mm on the left,
//! top and right, with the automatic page break 20 mm above the bottom edge
//! unless [`Document::set_page_break_margin`] moves it.

mod document;
mod metrics;

pub use document::Document;
pub use metrics::{encode_win_ansi, Font};

use thiserror::Error;

/// Errors returned by flowpdf.
#[derive(Error, Debug)]
pub enum Error {
    /// Writing the serialised document to the sink failed.
    #[error("I/O error while writing PDF: {0}")]
    Io(#[from] std::io::Error),

    /// The PDF object model could not be serialised.
    #[error("PDF serialisation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Text was placed before [`Document::add_page`] was called.
    #[error("no page: call add_page() before placing text")]
    NoPage,

    /// Text was placed before [`Document::set_font`] was called.
    #[error("no font selected: call set_font() before placing text")]
    NoFont,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
