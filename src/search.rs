//! Prefix queries against the write-through name index. The index is fed by
//! the store on every restaurant hash write; this module only reads it.

use crate::{
    error::AppError,
    keys,
    store::{DataStore, SearchDoc},
};

pub async fn by_name_prefix(
    store: &dyn DataStore,
    term: &str,
) -> Result<Vec<SearchDoc>, AppError> {
    let prefix = sanitize(term);
    // A bare `@name:*` is a syntax error to the index, so a term that
    // sanitizes away entirely is rejected before any query goes out.
    if prefix.trim().is_empty() {
        return Err(AppError::Validation("search term must not be empty".into()));
    }
    let query = format!("@name:{prefix}*");
    store.ft_search(&keys::search_index(), &query).await
}

/// Strips query-syntax characters so user input stays a plain prefix term.
fn sanitize(term: &str) -> String {
    term.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}
