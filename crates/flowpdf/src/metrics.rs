//! Core-14 font metrics and WinAnsi encoding.
//!
//! Widths are in thousandths of an em, taken from the Adobe AFM files that
//! ship with every conforming PDF viewer. Only the printable ASCII range is
//! tabulated for Times-Roman; accented WinAnsi glyphs fall back to an
//! average width, which is close enough for line breaking.

/// A standard (non-embedded) PDF font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Times-Roman, proportional serif.
    TimesRoman,
}

impl Font {
    /// The `/BaseFont` name written into the font resource.
    pub fn base_name(self) -> &'static str {
        match self {
            Font::TimesRoman => "Times-Roman",
        }
    }

    /// Advance width of a WinAnsi-encoded byte, in 1/1000 em.
    pub fn glyph_width(self, byte: u8) -> u32 {
        match (self, byte) {
            (Font::TimesRoman, 0x20..=0x7E) => {
                u32::from(TIMES_ROMAN_ASCII[(byte - 0x20) as usize])
            }
            (Font::TimesRoman, _) => TIMES_ROMAN_FALLBACK,
        }
    }
}

const TIMES_ROMAN_FALLBACK: u32 = 500;

// 0x20 (space) ..= 0x7E (asciitilde)
#[rustfmt::skip]
const TIMES_ROMAN_ASCII: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

/// Encode text as WinAnsi (Windows-1252) bytes.
///
/// Carriage returns are dropped and tabs become a single space. Newlines are
/// kept so the layout engine can break on them. Anything without a WinAnsi
/// code point is replaced by `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\r' => {}
            '\n' => out.push(b'\n'),
            '\t' => out.push(b' '),
            ' '..='~' => out.push(ch as u8),
            '\u{A0}'..='\u{FF}' => out.push(ch as u32 as u8),
            other => out.push(cp1252_special(other).unwrap_or(b'?')),
        }
    }
    out
}

fn cp1252_special(ch: char) -> Option<u8> {
    let byte = match ch {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_roman_known_widths() {
        assert_eq!(Font::TimesRoman.glyph_width(b' '), 250);
        assert_eq!(Font::TimesRoman.glyph_width(b'W'), 944);
        assert_eq!(Font::TimesRoman.glyph_width(b'i'), 278);
        assert_eq!(Font::TimesRoman.glyph_width(b'~'), 541);
        assert_eq!(Font::TimesRoman.glyph_width(0xE9), TIMES_ROMAN_FALLBACK);
    }

    #[test]
    fn encode_latin1_and_cp1252() {
        assert_eq!(encode_win_ansi("café"), b"caf\xE9".to_vec());
        assert_eq!(encode_win_ansi("5 €"), b"5 \x80".to_vec());
        assert_eq!(encode_win_ansi("“q”"), b"\x93q\x94".to_vec());
    }

    #[test]
    fn encode_replaces_unmappable() {
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn encode_normalises_line_endings_and_tabs() {
        assert_eq!(encode_win_ansi("a\r\nb\tc"), b"a\nb c".to_vec());
    }
}
