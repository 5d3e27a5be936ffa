//! Read-side query layer: filter → offset → limit over a dataset snapshot.
//!
//! Pure function of (snapshot, parameters) → result; never mutates the
//! dataset. Filtering preserves dataset order, then `offset` and `limit`
//! slice the filtered sequence, in that order.

use crate::record::Record;

/// Optional transformations applied to a read request.
#[derive(Debug, Default, Clone)]
pub struct QueryParams {
    /// Case-insensitive substring matched against every field of a record.
    pub search: Option<String>,
    /// Records to skip after filtering.
    pub offset: Option<usize>,
    /// Cap on the result length, applied after `offset`.
    pub limit: Option<usize>,
}

impl QueryParams {
    /// Parse an index-like request parameter. Non-numeric values are treated
    /// as absent — no error, no clamping.
    pub fn parse_index(raw: Option<&str>) -> Option<usize> {
        raw.and_then(|s| s.trim().parse::<usize>().ok())
    }
}

/// A page of records plus the informational counts.
#[derive(Debug)]
pub struct QueryResult {
    pub records: Vec<Record>,
    /// Dataset size before filtering.
    pub total: usize,
    /// Match count after the search filter, before pagination.
    pub filtered: usize,
}

/// Apply `params` to a dataset snapshot.
pub fn run_query(dataset: &[Record], params: &QueryParams) -> QueryResult {
    let total = dataset.len();

    let matched: Vec<&Record> = match params.search.as_deref() {
        Some(term) if !term.is_empty() => {
            let needle = term.to_lowercase();
            dataset.iter().filter(|r| r.matches(&needle)).collect()
        }
        _ => dataset.iter().collect(),
    };
    let filtered = matched.len();

    let records = matched
        .into_iter()
        .skip(params.offset.unwrap_or(0))
        .take(params.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();

    QueryResult {
        records,
        total,
        filtered,
    }
}
