use serde::Serialize;
use serde_json::Value;

/// Upper bound for a page size unless the caller passes its own.
pub const DEFAULT_MAX_LIMIT: i64 = 1000;

/// Clamped pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub skip: i64,
    pub limit: i64,
}

impl Pagination {
    /// Slice bounds for a collection of `len` items.
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        let start = usize::try_from(self.skip).unwrap_or(usize::MAX).min(len);
        let end = start
            .saturating_add(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .min(len);
        start..end
    }
}

/// Clamp `skip` to >= 0 and `limit` to `1..=max_limit`.
pub fn normalize_pagination(skip: i64, limit: i64, max_limit: i64) -> Pagination {
    Pagination {
        skip: skip.max(0),
        limit: limit.max(1).min(max_limit.max(1)),
    }
}

/// Recursively merge two JSON values. Objects are merged key by key with
/// `overlay` winning; any other combination returns `overlay`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}
