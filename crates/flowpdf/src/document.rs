//! Page state, the flowing-cell layout, and serialisation through lopdf.

use crate::metrics::{encode_win_ansi, Font};
use crate::{Error, Result};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream};
use std::io::Write;

/// Points per millimetre.
const PT_PER_MM: f64 = 72.0 / 25.4;

/// Default page margin (left, top, right), in millimetres.
const DEFAULT_MARGIN_MM: f64 = 10.0;

// A4 portrait, in millimetres.
const A4_WIDTH_MM: f64 = 210.0;
const A4_HEIGHT_MM: f64 = 297.0;

/// An in-memory PDF under construction.
///
/// Coordinates follow the usual top-left convention: `x` grows to the right
/// and `y` grows downwards, both in millimetres. Conversion to PDF user
/// space happens when text is emitted.
#[derive(Debug)]
pub struct Document {
    width: f64,
    height: f64,
    left_margin: f64,
    top_margin: f64,
    right_margin: f64,
    cell_margin: f64,
    page_break_trigger: f64,
    x: f64,
    y: f64,
    font: Option<(Font, f64)>,
    fonts_used: Vec<Font>,
    pages: Vec<Vec<u8>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty A4 portrait document. No page exists until
    /// [`Document::add_page`].
    pub fn new() -> Self {
        let bottom_margin = DEFAULT_MARGIN_MM * 2.0;
        Self {
            width: A4_WIDTH_MM,
            height: A4_HEIGHT_MM,
            left_margin: DEFAULT_MARGIN_MM,
            top_margin: DEFAULT_MARGIN_MM,
            right_margin: DEFAULT_MARGIN_MM,
            cell_margin: DEFAULT_MARGIN_MM / 10.0,
            page_break_trigger: A4_HEIGHT_MM - bottom_margin,
            x: DEFAULT_MARGIN_MM,
            y: DEFAULT_MARGIN_MM,
            font: None,
            fonts_used: Vec::new(),
            pages: Vec::new(),
        }
    }

    /// Place the automatic page break `margin` millimetres above the bottom
    /// edge.
    pub fn set_page_break_margin(&mut self, margin: f64) {
        self.page_break_trigger = self.height - margin;
    }

    /// Start a new page and move the cursor to its top-left margin corner.
    pub fn add_page(&mut self) {
        self.pages.push(Vec::new());
        self.x = self.left_margin;
        self.y = self.top_margin;
    }

    /// Select the font used by subsequent text, size in points.
    pub fn set_font(&mut self, font: Font, size_pt: f64) {
        if !self.fonts_used.contains(&font) {
            self.fonts_used.push(font);
        }
        self.font = Some((font, size_pt));
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Lay `text` out as a flowing cell `width` mm wide with lines `line_height`
    /// mm apart. A `width` of zero extends the cell to the right margin.
    ///
    /// Lines wrap at the last space that fits; a word wider than the cell is
    /// split at the first character that overflows. `\n` forces a break.
    /// Pages are added whenever the next line would cross the break trigger.
    pub fn multi_cell(&mut self, width: f64, line_height: f64, text: &str) -> Result<()> {
        if self.pages.is_empty() {
            return Err(Error::NoPage);
        }
        let (font, size_pt) = self.font.ok_or(Error::NoFont)?;
        let font_size = size_pt / PT_PER_MM;

        let width = if width == 0.0 {
            self.width - self.right_margin - self.x
        } else {
            width
        };
        let max_width = (width - 2.0 * self.cell_margin) * 1000.0 / font_size;

        let mut s = encode_win_ansi(text);
        // A final newline ends the last line; it does not open another one.
        if s.last() == Some(&b'\n') {
            s.pop();
        }
        let mut sep: Option<usize> = None;
        let mut start = 0usize;
        let mut i = 0usize;
        let mut line_width = 0u32;

        while i < s.len() {
            let c = s[i];
            if c == b'\n' {
                self.line(line_height, &s[start..i]);
                i += 1;
                sep = None;
                start = i;
                line_width = 0;
                continue;
            }
            if c == b' ' {
                sep = Some(i);
            }
            line_width += font.glyph_width(c);
            if f64::from(line_width) > max_width {
                match sep {
                    None => {
                        if i == start {
                            i += 1;
                        }
                        self.line(line_height, &s[start..i]);
                    }
                    Some(space) => {
                        self.line(line_height, &s[start..space]);
                        i = space + 1;
                    }
                }
                sep = None;
                start = i;
                line_width = 0;
            } else {
                i += 1;
            }
        }
        self.line(line_height, &s[start..i]);
        self.x = self.left_margin;
        Ok(())
    }

    /// Emit one already-wrapped line at the cursor and advance it.
    fn line(&mut self, line_height: f64, text: &[u8]) {
        if self.y + line_height > self.page_break_trigger {
            let x = self.x;
            self.add_page();
            self.x = x;
        }

        if !text.is_empty() {
            if let Some((font, size_pt)) = self.font {
                let font_size = size_pt / PT_PER_MM;
                let resource = self.font_resource_name(font);
                let tx = (self.x + self.cell_margin) * PT_PER_MM;
                let ty = (self.height - (self.y + 0.5 * line_height + 0.3 * font_size)) * PT_PER_MM;

                let mut op = format!("BT /{resource} {size_pt:.2} Tf {tx:.2} {ty:.2} Td (").into_bytes();
                escape_literal(text, &mut op);
                op.extend_from_slice(b") Tj ET\n");

                if let Some(page) = self.pages.last_mut() {
                    page.extend_from_slice(&op);
                }
            }
        }

        self.y += line_height;
    }

    fn font_resource_name(&self, font: Font) -> String {
        let idx = self
            .fonts_used
            .iter()
            .position(|f| *f == font)
            .unwrap_or(0);
        format!("F{}", idx + 1)
    }

    /// Serialise the document to `sink`.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        let mut doc = self.build()?;
        doc.save_to(sink)?;
        sink.flush()?;
        Ok(())
    }

    /// Serialise the document into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    fn build(&self) -> Result<lopdf::Document> {
        let mut doc = lopdf::Document::with_version("1.4");
        let pages_id: ObjectId = doc.new_object_id();

        let mut font_dict = Dictionary::new();
        for (idx, font) in self.fonts_used.iter().enumerate() {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_name(),
                "Encoding" => "WinAnsiEncoding",
            });
            font_dict.set(format!("F{}", idx + 1), font_id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => font_dict,
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for content in &self.pages {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.clone()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(self.pages.len() as i64),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real((self.width * PT_PER_MM) as _),
                Object::Real((self.height * PT_PER_MM) as _),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal("flowpdf"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        Ok(doc)
    }
}

/// Append `text` to `out` as the body of a PDF literal string.
fn escape_literal(text: &[u8], out: &mut Vec<u8>) {
    for &b in text {
        match b {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(b);
            }
            _ => out.push(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times_doc() -> Document {
        let mut doc = Document::new();
        doc.add_page();
        doc.set_font(Font::TimesRoman, 12.0);
        doc
    }

    fn shown_lines(doc: &Document) -> usize {
        doc.pages
            .iter()
            .map(|p| p.windows(2).filter(|w| *w == b"Tj").count())
            .sum()
    }

    #[test]
    fn empty_text_is_one_blank_page() {
        let mut doc = times_doc();
        doc.multi_cell(0.0, 5.0, "").unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(shown_lines(&doc), 0);

        let bytes = doc.to_bytes().unwrap();
        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);
    }

    #[test]
    fn short_text_single_line() {
        let mut doc = times_doc();
        doc.multi_cell(0.0, 5.0, "Hello World").unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(shown_lines(&doc), 1);
        let content = String::from_utf8_lossy(&doc.pages[0]).to_string();
        assert!(content.contains("(Hello World) Tj"), "got: {content}");
    }

    #[test]
    fn long_paragraph_wraps_at_spaces() {
        let mut doc = times_doc();
        let text = "lorem ipsum dolor sit amet ".repeat(40);
        doc.multi_cell(0.0, 5.0, &text).unwrap();
        assert!(shown_lines(&doc) > 1);
        // No wrapped line may start with the separating space.
        let content = String::from_utf8_lossy(&doc.pages[0]).to_string();
        assert!(!content.contains("Td ( "), "got: {content}");
    }

    #[test]
    fn unbreakable_word_is_split() {
        let mut doc = times_doc();
        let word = "W".repeat(200);
        doc.multi_cell(0.0, 5.0, &word).unwrap();
        assert!(shown_lines(&doc) >= 2);
    }

    #[test]
    fn newlines_force_breaks_and_pages_flow() {
        let mut doc = times_doc();
        let text = (1..=200).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n");
        doc.multi_cell(0.0, 5.0, &text).unwrap();
        assert_eq!(shown_lines(&doc), 200);
        // 53 lines of 5 mm fit between the 10 mm top margin and the 277 mm trigger.
        assert_eq!(doc.page_count(), 4);

        let parsed = lopdf::Document::load_mem(&doc.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed.get_pages().len(), 4);
    }

    #[test]
    fn parentheses_are_escaped() {
        let mut doc = times_doc();
        doc.multi_cell(0.0, 5.0, r"f(x) \ g").unwrap();
        let content = String::from_utf8_lossy(&doc.pages[0]).to_string();
        assert!(content.contains(r"(f\(x\) \\ g) Tj"), "got: {content}");
    }

    #[test]
    fn placing_text_requires_page_and_font() {
        let mut doc = Document::new();
        assert!(matches!(doc.multi_cell(0.0, 5.0, "x"), Err(Error::NoPage)));
        doc.add_page();
        assert!(matches!(doc.multi_cell(0.0, 5.0, "x"), Err(Error::NoFont)));
    }

    #[test]
    fn full_page_ending_in_newline_stays_one_page() {
        let mut doc = times_doc();
        let text: String = (1..=53).map(|n| format!("line {n}\n")).collect();
        doc.multi_cell(0.0, 5.0, &text).unwrap();
        assert_eq!(shown_lines(&doc), 53);
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn only_one_trailing_newline_is_dropped() {
        let mut doc = times_doc();
        let text: String = (1..=53).map(|n| format!("line {n}\n")).collect();
        doc.multi_cell(0.0, 5.0, &format!("{text}\n")).unwrap();
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn page_is_a4_portrait() {
        let doc = Document::new();
        assert_eq!((doc.width, doc.height), (210.0, 297.0));
    }

    #[test]
    fn break_margin_moves_trigger() {
        let mut doc = times_doc();
        doc.set_page_break_margin(150.0);
        let text = (1..=40).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n");
        doc.multi_cell(0.0, 5.0, &text).unwrap();
        // 10 mm top margin, trigger at 147 mm: 27 lines per page.
        assert_eq!(doc.page_count(), 2);
    }
}
