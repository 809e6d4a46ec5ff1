use std::collections::BTreeSet;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("invalid page selection syntax near '{0}'")]
    Syntax(String),
    #[error("selection matched no pages of a {page_count}-page document")]
    NoValidPages { page_count: usize },
}

/// A user-supplied description of which pages to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSpec {
    /// Explicit page numbers, in any order, possibly with duplicates.
    List(Vec<usize>),
    /// Comma-separated integers and inclusive ranges, e.g. `1-4,7`.
    Expr(String),
}

impl From<&str> for PageSpec {
    fn from(value: &str) -> Self {
        PageSpec::Expr(value.to_string())
    }
}

/// Resolve a page spec against a document's page count.
///
/// Returns a strictly ascending, duplicate-free list of 1-based page
/// numbers. `None` selects every page. Out-of-bounds numbers are dropped;
/// a range with `start > end` contributes nothing. Malformed syntax fails
/// the whole parse rather than yielding a partial result.
pub fn resolve(spec: Option<&PageSpec>, page_count: usize) -> Result<Vec<usize>, SelectionError> {
    let Some(spec) = spec else {
        return Ok((1..=page_count).collect());
    };

    let selected: BTreeSet<usize> = match spec {
        PageSpec::List(numbers) => numbers
            .iter()
            .copied()
            .filter(|page| (1..=page_count).contains(page))
            .collect(),
        PageSpec::Expr(expr) => expand_expr(expr, page_count)?,
    };

    if selected.is_empty() {
        return Err(SelectionError::NoValidPages { page_count });
    }
    Ok(selected.into_iter().collect())
}

fn expand_expr(expr: &str, page_count: usize) -> Result<BTreeSet<usize>, SelectionError> {
    let mut selected = BTreeSet::new();
    for token in expr.split(',') {
        let token = token.trim();
        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_number(start)?;
                let end = parse_number(end)?;
                // A reversed range is an empty contribution, not an error.
                selected.extend((start..=end).filter(|page| (1..=page_count).contains(page)));
            }
            None => {
                let page = parse_number(token)?;
                if (1..=page_count).contains(&page) {
                    selected.insert(page);
                }
            }
        }
    }
    Ok(selected)
}

fn parse_number(token: &str) -> Result<usize, SelectionError> {
    token
        .trim()
        .parse::<usize>()
        .map_err(|_| SelectionError::Syntax(token.trim().to_string()))
}
