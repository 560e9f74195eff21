use serde::{Deserialize, Deserializer};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Offset pagination query (`?page=&limit=`), 1-based pages.
/// Pages past the end of a result set are empty, never an error.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page", deserialize_with = "usize_from_query")]
    pub page: usize,
    #[serde(default = "default_limit", deserialize_with = "usize_from_query")]
    pub limit: usize,
}

// Query values reach a flattened struct as strings, so parse rather than
// expecting a number.
fn usize_from_query<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for PageQuery {
    fn default() -> Self {
        PageQuery {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageQuery {
    /// Page clamped to >= 1, limit clamped to 1..=MAX_PAGE_SIZE.
    pub fn clamped(&self) -> (usize, usize) {
        (self.page.max(1), self.limit.clamp(1, MAX_PAGE_SIZE))
    }
}
