use serde::{Deserialize, Serialize};

const MAX_PAGE_SIZE: u64 = 100;
const DEFAULT_PAGE_SIZE: u64 = 10;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub current: u64,
    pub size: u64,
}

impl PageRequest {
    /// Builds a request, clamping `current` to at least 1 and `size` to `1..=100`.
    pub fn new(current: u64, size: u64) -> Self {
        Self {
            current: current.max(1),
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        (self.current.max(1) - 1).saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: u64,
    pub current: u64,
    pub size: u64,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            records,
            total,
            current: request.current,
            size: request.size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            records: self.records.into_iter().map(f).collect(),
            total: self.total,
            current: self.current,
            size: self.size,
        }
    }
}
