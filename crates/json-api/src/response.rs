//! Success envelopes and page query handling

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::Json,
};
use serde::{Deserialize, Serialize};

use storefront_app::pagination::{Page, Paginated};

const SUCCESS_STATUS: &str = "success";

/// Page size used when a listing request does not name one.
pub(crate) const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Single resource response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApiResponse<T: ToSchema + 'static> {
    /// Always `success`
    pub status: String,

    /// The resource
    pub data: T,
}

impl<T: ToSchema + 'static> ApiResponse<T> {
    pub(crate) fn success(data: T) -> Json<Self> {
        Json(Self {
            status: SUCCESS_STATUS.to_string(),
            data,
        })
    }
}

/// Paginated listing response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ListResponse<T: ToSchema + 'static> {
    /// Always `success`
    pub status: String,

    /// Number of records on this page
    pub count: usize,

    /// Number of records across all pages
    pub total: u64,

    /// Neighbouring pages, when they exist
    pub pagination: Pagination,

    /// The records on this page
    pub data: Vec<T>,
}

impl<T: ToSchema + 'static> ListResponse<T> {
    pub(crate) fn from_page<R>(page: Paginated<R>) -> Json<Self>
    where
        T: From<R>,
    {
        let pagination = Pagination {
            next: page.next().map(PageLink::from),
            prev: page.prev().map(PageLink::from),
        };

        let data: Vec<T> = page.records.into_iter().map(T::from).collect();

        Json(Self {
            status: SUCCESS_STATUS.to_string(),
            count: data.len(),
            total: page.total,
            pagination,
            data,
        })
    }
}

/// Links to the pages either side of the current one
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct Pagination {
    /// The following page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,

    /// The preceding page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

/// A page reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct PageLink {
    pub page: u32,
    pub limit: u32,
}

impl From<Page> for PageLink {
    fn from(page: Page) -> Self {
        Self {
            page: page.page(),
            limit: page.limit(),
        }
    }
}

/// Build a [`Page`] from the optional `page` and `limit` query parameters.
pub(crate) fn requested_page(page: QueryParam<u32, false>, limit: QueryParam<u32, false>) -> Page {
    Page::new(page.into_inner(), limit.into_inner(), DEFAULT_PAGE_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_response_links_neighbouring_pages() {
        let page = Paginated {
            records: vec![4_u32, 5, 6],
            page: Page::new(Some(2), Some(3), DEFAULT_PAGE_LIMIT),
            total: 10,
        };

        let Json(response) = ListResponse::<u64>::from_page(page);

        assert_eq!(response.status, "success");
        assert_eq!(response.count, 3);
        assert_eq!(response.total, 10);
        assert_eq!(response.data, vec![4, 5, 6]);
        assert_eq!(response.pagination.next, Some(PageLink { page: 3, limit: 3 }));
        assert_eq!(response.pagination.prev, Some(PageLink { page: 1, limit: 3 }));
    }

    #[test]
    fn single_page_has_no_links() {
        let page = Paginated {
            records: vec![1_u32],
            page: Page::new(None, None, DEFAULT_PAGE_LIMIT),
            total: 1,
        };

        let Json(response) = ListResponse::<u64>::from_page(page);

        assert_eq!(response.pagination.next, None);
        assert_eq!(response.pagination.prev, None);
    }
}
