use std::collections::BTreeSet;
use std::path::Path;

use formschema::FormDocument;

use crate::page_range::parse_page_range;

/// Open a form PDF with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is missing,
/// does not have a `.pdf` extension, or cannot be parsed.
pub fn open_form(file: &Path) -> Result<FormDocument, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }
    if !has_pdf_extension(file) {
        eprintln!("Error: expected a .pdf file: {}", file.display());
        return Err(1);
    }

    FormDocument::open_file(file).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

pub fn has_pdf_extension(file: &Path) -> bool {
    file.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Resolve an optional page selection into 1-based page numbers.
pub fn resolve_pages(pages: Option<&str>, page_count: usize) -> Result<BTreeSet<usize>, i32> {
    match pages {
        Some(range) => parse_page_range(range, page_count).map_err(|e| {
            eprintln!("Error: {e}");
            1
        }),
        None => Ok((1..=page_count).collect()),
    }
}

/// Escape a string for CSV output.
///
/// If the text contains commas, double quotes, or newlines, wraps it in
/// double quotes and escapes any internal double quotes by doubling them.
pub fn csv_escape(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(has_pdf_extension(Path::new("form.pdf")));
        assert!(has_pdf_extension(Path::new("FORM.PDF")));
        assert!(!has_pdf_extension(Path::new("form.txt")));
        assert!(!has_pdf_extension(Path::new("form")));
    }

    #[test]
    fn all_pages_when_unspecified() {
        let pages: Vec<usize> = resolve_pages(None, 3).unwrap().into_iter().collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[test]
    fn csv_escape_quotes_when_needed() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("two\nlines"), "\"two\nlines\"");
    }
}
