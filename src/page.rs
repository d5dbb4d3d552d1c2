use axum::http::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::pageable::Pageable;

/// One page of results plus the metadata needed to fetch the others.
///
/// Serialized as `{content, totalElements, totalPages, pageNumber, pageSize}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    /// Zero-based
    pub page_number: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(content: Vec<T>, pageable: &Pageable, total_elements: u64) -> Self {
        let page_size = pageable.size.max(1);
        Self {
            content,
            total_elements,
            total_pages: total_elements.div_ceil(page_size),
            page_number: pageable.page,
            page_size,
        }
    }

    /// Convert every element, keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// `Content-Range: {resource} {first}-{last}/{total}` for this page, or
    /// `{resource} */{total}` when the page holds no records.
    #[must_use]
    pub fn content_range(&self, resource_name: &str) -> HeaderMap {
        let first = self.page_number.saturating_mul(self.page_size);
        let range = if first >= self.total_elements {
            "*".to_string()
        } else {
            let last = first
                .saturating_add(self.page_size)
                .saturating_sub(1)
                .min(self.total_elements - 1);
            format!("{first}-{last}")
        };

        // Sanitize resource name to prevent header injection
        let safe_name: String = resource_name
            .chars()
            .filter(|c| c.is_ascii() && !c.is_ascii_control())
            .collect();

        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("{safe_name} {range}/{}", self.total_elements))
            .unwrap_or_else(|_| HeaderValue::from_static("items 0-0/0"));
        headers.insert("Content-Range", value);
        headers
    }
}
