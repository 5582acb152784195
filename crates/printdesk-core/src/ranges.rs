//! Page range expressions such as `"1-5,7,9-12"`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RangeError;

/// Largest number of pages a single `A-B` token may expand to.
pub const MAX_RANGE_SPAN: u32 = 100_000;

/// Largest number of entries a whole expression may expand to.
pub const MAX_TOTAL_PAGES: usize = 100_000;

/// Expanded page numbers, in the order the expression lists them.
///
/// Overlapping tokens produce duplicates; [`len`](Self::len) counts them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageRangeSet(Vec<u32>);

impl PageRangeSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pages(&self) -> &[u32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Distinct pages in ascending order.
    pub fn distinct(&self) -> BTreeSet<u32> {
        self.0.iter().copied().collect()
    }

    /// Distinct pages that exist in a document of `page_count` pages.
    pub fn within(&self, page_count: u32) -> BTreeSet<u32> {
        self.0
            .iter()
            .copied()
            .filter(|&p| p <= page_count)
            .collect()
    }

    /// Number of entries that repeat an earlier one.
    pub fn duplicate_count(&self) -> usize {
        self.0.len() - self.distinct().len()
    }
}

impl FromStr for PageRangeSet {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_page_ranges(s)
    }
}

impl From<Vec<u32>> for PageRangeSet {
    fn from(pages: Vec<u32>) -> Self {
        Self(pages)
    }
}

impl fmt::Display for PageRangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Parse a range expression into page numbers.
///
/// Tokens are separated by `,`; each is either `N` or `A-B` with `A <= B`.
/// An empty expression yields an empty set. Any bad token fails the whole
/// expression.
pub fn parse_page_ranges(expr: &str) -> Result<PageRangeSet, RangeError> {
    let mut pages = Vec::new();

    if expr.is_empty() {
        return Ok(PageRangeSet(pages));
    }

    for token in expr.split(',') {
        if token.is_empty() {
            return Err(RangeError::EmptyToken(expr.to_string()));
        }

        let bounds: Vec<&str> = token.split('-').collect();
        match bounds.as_slice() {
            [single] => {
                let page = parse_page(single)?;
                check_total(pages.len(), 1)?;
                pages.push(page);
            }
            [start, end] => {
                let start = parse_page(start)?;
                let end = parse_page(end)?;
                if start > end {
                    return Err(RangeError::Reversed { start, end });
                }
                if end - start >= MAX_RANGE_SPAN {
                    return Err(RangeError::TooLarge {
                        start,
                        end,
                        max: MAX_RANGE_SPAN,
                    });
                }
                check_total(pages.len(), (end - start) as usize + 1)?;
                pages.extend(start..=end);
            }
            _ => return Err(RangeError::InvalidNumber(token.to_string())),
        }
    }

    Ok(PageRangeSet(pages))
}

fn check_total(current: usize, adding: usize) -> Result<(), RangeError> {
    if current + adding > MAX_TOTAL_PAGES {
        return Err(RangeError::TooManyPages {
            max: MAX_TOTAL_PAGES,
        });
    }
    Ok(())
}

fn parse_page(s: &str) -> Result<u32, RangeError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::InvalidNumber(s.to_string()));
    }
    let page: u32 = s
        .parse()
        .map_err(|_| RangeError::InvalidNumber(s.to_string()))?;
    if page == 0 {
        return Err(RangeError::ZeroPage(s.to_string()));
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_mixed_expression() {
        let set = parse_page_ranges("1-3,5").unwrap();
        assert_eq!(set.pages(), &[1, 2, 3, 5]);

        let set = parse_page_ranges("1-5,7,9-12").unwrap();
        assert_eq!(set.pages(), &[1, 2, 3, 4, 5, 7, 9, 10, 11, 12]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_page_ranges("").unwrap().is_empty());
    }

    #[test]
    fn test_overlap_keeps_duplicates() {
        let set = parse_page_ranges("1-3,2-4").unwrap();
        assert_eq!(set.len(), 6);
        assert_eq!(set.distinct().len(), 4);
        assert_eq!(set.duplicate_count(), 2);
    }

    #[test]
    fn test_malformed_expressions() {
        assert_eq!(
            parse_page_ranges("3-1"),
            Err(RangeError::Reversed { start: 3, end: 1 })
        );
        assert!(matches!(
            parse_page_ranges("abc"),
            Err(RangeError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_page_ranges("1,,2"),
            Err(RangeError::EmptyToken(_))
        ));
        assert!(matches!(
            parse_page_ranges("1,"),
            Err(RangeError::EmptyToken(_))
        ));
        assert!(matches!(
            parse_page_ranges("0-2"),
            Err(RangeError::ZeroPage(_))
        ));
        assert!(parse_page_ranges("1-2-3").is_err());
        assert!(parse_page_ranges("-2").is_err());
        assert!(parse_page_ranges(" 1").is_err());
        assert!(parse_page_ranges("+1").is_err());
    }

    #[test]
    fn test_span_limit() {
        assert!(matches!(
            parse_page_ranges("1-4000000000"),
            Err(RangeError::TooLarge { .. })
        ));
        assert_eq!(parse_page_ranges("1-100000").unwrap().len(), 100_000);
    }

    #[test]
    fn test_total_expansion_limit() {
        let repeated = vec!["1-100000"; 200].join(",");
        assert_eq!(
            parse_page_ranges(&repeated),
            Err(RangeError::TooManyPages { max: MAX_TOTAL_PAGES })
        );

        assert!(matches!(
            parse_page_ranges("1-100000,7"),
            Err(RangeError::TooManyPages { .. })
        ));

        let many_singles = vec!["3"; MAX_TOTAL_PAGES].join(",");
        assert_eq!(parse_page_ranges(&many_singles).unwrap().len(), MAX_TOTAL_PAGES);
    }

    #[test]
    fn test_within_clamps() {
        let set = parse_page_ranges("2,99,3,2").unwrap();
        let pages: Vec<u32> = set.within(3).into_iter().collect();
        assert_eq!(pages, vec![2, 3]);
    }

    #[test]
    fn test_display_and_from_str() {
        let set: PageRangeSet = "4-6".parse().unwrap();
        assert_eq!(set.to_string(), "4,5,6");
    }
}
