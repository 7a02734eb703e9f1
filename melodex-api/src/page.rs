//! Keyset page assembly
//!
//! Queries fetch one row beyond the requested size; the surplus row only
//! proves another page exists and is never returned to the client.

use serde::Serialize;

/// One page of results plus continuation state
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub next_cursor: Option<String>,
    pub size: i64,
}

/// Turn a size+1 row fetch into a page
///
/// `encode_last` maps the last returned row to the cursor for the next
/// page; it is only invoked when a next page exists.
pub fn assemble<T>(mut rows: Vec<T>, size: i64, encode_last: impl Fn(&T) -> String) -> Page<T> {
    let has_next = rows.len() as i64 > size;
    if has_next {
        rows.truncate(size as usize);
    }
    let next_cursor = if has_next {
        rows.last().map(&encode_last)
    } else {
        None
    };

    Page {
        items: rows,
        has_next,
        next_cursor,
        size,
    }
}
