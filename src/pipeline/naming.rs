//! Output object naming.

/// Extension appended to the derived name.
pub const PDF_EXTENSION: &str = ".pdf";

/// Derive the PDF object name from a source object name.
///
/// Everything from the *first* `.` onwards is dropped, so `"report.txt"`
/// becomes `"report.pdf"` and `"report.v2.txt"` becomes `"report.pdf"` as
/// well. Names without a dot simply gain the extension.
pub fn derive_output_name(object_name: &str) -> String {
    format!("{}{PDF_EXTENSION}", output_stem(object_name))
}

/// The part of `object_name` before its first `.`.
pub fn output_stem(object_name: &str) -> &str {
    object_name
        .split_once('.')
        .map_or(object_name, |(stem, _)| stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_extension_is_replaced() {
        assert_eq!(derive_output_name("report.txt"), "report.pdf");
        assert_eq!(derive_output_name("greeting.txt"), "greeting.pdf");
    }

    #[test]
    fn only_first_dot_segment_is_kept() {
        assert_eq!(derive_output_name("a.b.txt"), "a.pdf");
        assert_eq!(derive_output_name("report.v2.txt"), "report.pdf");
    }

    #[test]
    fn names_without_extension_gain_one() {
        assert_eq!(derive_output_name("README"), "README.pdf");
    }

    #[test]
    fn leading_dot_yields_bare_extension() {
        assert_eq!(derive_output_name(".hidden"), ".pdf");
    }

    #[test]
    fn prefixes_are_preserved() {
        assert_eq!(derive_output_name("inbox/notes.txt"), "inbox/notes.pdf");
    }
}
