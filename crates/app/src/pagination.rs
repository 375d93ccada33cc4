//! Page-based listing

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A requested page of results, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    limit: u32,
}

impl Page {
    /// Build a page request, falling back to page 1 and `default_limit` for
    /// missing or out-of-range values.
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        let page = page.filter(|page| *page >= 1).unwrap_or(1);

        let limit = limit
            .filter(|limit| *limit >= 1)
            .unwrap_or(default_limit)
            .min(MAX_PAGE_LIMIT);

        Self { page, limit }
    }

    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Number of records to skip before this page starts.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Select this page out of an already ordered slice.
    #[must_use]
    pub fn slice<'a, T>(self, records: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);

        records
            .get(start..)
            .map_or(&[], |rest| rest.get(..limit).unwrap_or(rest))
    }
}

/// One page of records plus the total number of matching records.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub records: Vec<T>,
    pub page: Page,
    pub total: u64,
}

impl<T> Paginated<T> {
    /// The following page, when more records remain.
    #[must_use]
    pub fn next(&self) -> Option<Page> {
        let end = u64::from(self.page.page) * u64::from(self.page.limit);

        (end < self.total).then(|| Page {
            page: self.page.page + 1,
            limit: self.page.limit,
        })
    }

    /// The preceding page, unless this is the first one.
    #[must_use]
    pub fn prev(&self) -> Option<Page> {
        (self.page.page > 1).then(|| Page {
            page: self.page.page - 1,
            limit: self.page.limit,
        })
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            records: self.records.into_iter().map(f).collect(),
            page: self.page,
            total: self.total,
        }
    }
}
