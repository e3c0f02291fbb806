use crate::error::ProcessingError;

/// Hard cap on the number of pages a selection may name
const MAX_SELECTED_PAGES: usize = 10_000;

/// 1-based pages parsed from expressions such as `1-3,5,8-`.
///
/// An open-ended range (`8-`) runs to the last page and is resolved by
/// [`PageSelection::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    ranges: Vec<(u32, Option<u32>)>,
}

impl PageSelection {
    pub fn parse(input: &str) -> Result<Self, ProcessingError> {
        let mut ranges = Vec::new();

        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let range = match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_page(start)?;
                    let end = if end.trim().is_empty() {
                        None
                    } else {
                        Some(parse_page(end)?)
                    };
                    if let Some(end) = end {
                        if end < start {
                            return Err(ProcessingError::InvalidParameters(format!(
                                "Page range '{}' is reversed",
                                part
                            )));
                        }
                    }
                    (start, end)
                }
                None => {
                    let page = parse_page(part)?;
                    (page, Some(page))
                }
            };
            ranges.push(range);
        }

        if ranges.is_empty() {
            return Err(ProcessingError::InvalidParameters(
                "No pages selected".to_string(),
            ));
        }

        Ok(Self { ranges })
    }

    /// Expand against a document with `page_count` pages.
    ///
    /// Every named page must exist.
    pub fn resolve(&self, page_count: u32) -> Result<Vec<u32>, ProcessingError> {
        let mut pages = Vec::new();

        for &(start, end) in &self.ranges {
            let end = end.unwrap_or(page_count);
            if start > page_count || end > page_count {
                return Err(ProcessingError::InvalidParameters(format!(
                    "Page {} is out of range, the document has {} page(s)",
                    start.max(end),
                    page_count
                )));
            }
            pages.extend(start..=end);
            if pages.len() > MAX_SELECTED_PAGES {
                return Err(ProcessingError::InvalidParameters(
                    "Too many pages selected".to_string(),
                ));
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(pages)
    }
}

fn parse_page(value: &str) -> Result<u32, ProcessingError> {
    let value = value.trim();
    match value.parse::<u32>() {
        Ok(0) => Err(ProcessingError::InvalidParameters(
            "Page numbers start at 1".to_string(),
        )),
        Ok(page) => Ok(page),
        Err(_) => Err(ProcessingError::InvalidParameters(format!(
            "'{}' is not a page number",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_resolve() {
        let selection = PageSelection::parse("1-3, 5").unwrap();
        assert_eq!(selection.resolve(6).unwrap(), vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_overlapping_ranges_are_deduplicated() {
        let selection = PageSelection::parse("4,2-4,2").unwrap();
        assert_eq!(selection.resolve(4).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_open_ended_range_runs_to_last_page() {
        let selection = PageSelection::parse("3-").unwrap();
        assert_eq!(selection.resolve(5).unwrap(), vec![3, 4, 5]);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(PageSelection::parse("").is_err());
        assert!(PageSelection::parse(" , ").is_err());
        assert!(PageSelection::parse("0").is_err());
        assert!(PageSelection::parse("abc").is_err());
        assert!(PageSelection::parse("5-2").is_err());
    }

    #[test]
    fn test_resolve_rejects_missing_pages() {
        let selection = PageSelection::parse("2-9").unwrap();
        assert!(matches!(
            selection.resolve(3),
            Err(ProcessingError::InvalidParameters(_))
        ));
        assert!(PageSelection::parse("4-").unwrap().resolve(3).is_err());
    }
}
