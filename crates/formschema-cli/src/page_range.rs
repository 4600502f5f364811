use std::collections::BTreeSet;

/// Parse a 1-based page selection like `"1,3-5"` into the selected pages.
///
/// Pages stay 1-based to match field and text-run page numbers. Empty
/// segments are ignored; page 0, reversed ranges, and pages past the end of
/// the document are errors.
pub fn parse_page_range(input: &str, page_count: usize) -> Result<BTreeSet<usize>, String> {
    let mut pages = BTreeSet::new();

    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((start, end)) => (parse_page(start)?, parse_page(end)?),
            None => {
                let page = parse_page(part)?;
                (page, page)
            }
        };
        if start > end {
            return Err(format!("invalid page range: '{part}'"));
        }
        if end > page_count {
            return Err(format!(
                "page {end} exceeds document page count ({page_count})"
            ));
        }
        pages.extend(start..=end);
    }

    Ok(pages)
}

fn parse_page(text: &str) -> Result<usize, String> {
    let text = text.trim();
    match text.parse::<usize>() {
        Ok(0) => Err("page 0 is invalid (pages start at 1)".to_string()),
        Ok(page) => Ok(page),
        Err(_) => Err(format!("invalid page number: '{text}'")),
    }
}
