use serde::Serialize;

pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_OFFSET: i64 = 0;

/// Normalized window into a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, offset: DEFAULT_OFFSET }
    }
}

impl PageRequest {
    /// Parse raw query values. Unparseable or out-of-range values fall back to
    /// the defaults rather than failing the request.
    pub fn from_params(limit: Option<&str>, offset: Option<&str>, max_limit: Option<i64>) -> Self {
        let mut limit = limit
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT);
        let offset = offset
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|o| *o >= 0)
            .unwrap_or(DEFAULT_OFFSET);

        if let Some(max) = max_limit.filter(|m| *m > 0) {
            if limit > max {
                tracing::debug!("Limit {} exceeds max {}, capping to max", limit, max);
                limit = max;
            }
        }

        Self { limit, offset }
    }
}

/// Page envelope returned by every collection endpoint
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self { items, total, limit: request.limit, offset: request.offset }
    }
}
