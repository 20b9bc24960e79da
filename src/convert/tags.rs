//! Driver metadata dictionaries to [`Tags`]

use crate::domain::model::Tags;
use crate::error::AvResult;
use crate::ports::TagSource;

/// Copy every entry of `source` in driver order.
///
/// An absent source yields an empty mapping. A key reported twice is a
/// `DuplicateKey` error; values are never silently overwritten.
pub fn from_raw(source: Option<&dyn TagSource>) -> AvResult<Tags> {
    let mut tags = Tags::new();
    if let Some(source) = source {
        for (key, value) in source.entries() {
            tags.try_insert(key, value)?;
        }
    }
    Ok(tags)
}
