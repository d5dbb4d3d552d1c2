//! Page number, size and sort order for listing endpoints.
//!
//! Parsed from the raw query string so that `sort` may repeat:
//!
//! ```text
//! GET /todos?page=2&size=10&sort=priority,desc&sort=title
//! GET /todos?sort=created_at,title,asc
//! ```
//!
//! A `sort` value is a comma-separated list of properties optionally ending in
//! `asc` or `desc` (case-insensitive), which applies to every listed property.

use sea_orm::{ColumnTrait, Order};
use url::form_urlencoded;

use crate::config::PagingConfig;
use crate::errors::HttpServiceError;

/// Largest offset or limit the database drivers accept.
const MAX_ROWS: u64 = i64::MAX.unsigned_abs();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pageable {
    pub page: u64,
    pub size: u64,
    pub sort: Vec<SortOrder>,
}

impl Pageable {
    /// A page without sorting. `size` is raised to 1 if zero, and `page` is
    /// lowered until its offset fits in an `i64`.
    #[must_use]
    pub fn of(page: u64, size: u64) -> Self {
        let size = size.clamp(1, MAX_ROWS);
        Self {
            page: page.min(MAX_ROWS / size),
            size,
            sort: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_sort(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size).min(MAX_ROWS)
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.size.min(MAX_ROWS)
    }

    /// Parse `page`, `size` and `sort` from a raw query string.
    ///
    /// # Errors
    ///
    /// Returns 400 when `page` or `size` is not a non-negative integer, or
    /// when the requested page starts beyond the largest supported offset.
    pub fn from_query(query: Option<&str>, config: &PagingConfig) -> Result<Self, HttpServiceError> {
        let mut page = None;
        let mut size = None;
        let mut sort = Vec::new();

        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "page" => page = Some(parse_number("page", &value)?),
                "size" => size = Some(parse_number("size", &value)?),
                "sort" => sort.extend(parse_sort(&value)),
                _ => {}
            }
        }

        let page = match page {
            Some(page) if config.one_indexed_parameters => page.saturating_sub(1),
            Some(page) => page,
            None => 0,
        };
        let size = match size {
            Some(0) | None => config.default_page_size,
            Some(size) => size.min(config.max_page_size),
        }
        .clamp(1, MAX_ROWS);

        if page.checked_mul(size).is_none_or(|offset| offset > MAX_ROWS) {
            return Err(HttpServiceError::bad_request("Invalid page parameter")
                .with_errors([format!("page: offset of page {page} is out of range")]));
        }

        Ok(Self { page, size, sort })
    }

    /// Resolve sort properties against the allowed columns.
    ///
    /// Properties without a matching column are skipped.
    pub fn ordering<C>(&self, sortable: &[(&str, C)]) -> Vec<(C, Order)>
    where
        C: ColumnTrait + Copy,
    {
        self.sort
            .iter()
            .filter_map(|order| {
                let column = find_column(&order.property, sortable);
                if column.is_none() {
                    tracing::debug!(property = %order.property, "Ignoring unknown sort property");
                }
                column.map(|column| (column, order.direction.order()))
            })
            .collect()
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64, HttpServiceError> {
    value.trim().parse().map_err(|_| {
        HttpServiceError::bad_request(format!("Invalid {name} parameter"))
            .with_errors([format!("{name}: expected a non-negative integer, got '{value}'")])
    })
}

fn parse_sort(value: &str) -> Vec<SortOrder> {
    let mut parts: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    let direction = match parts.last().and_then(|last| Direction::parse(last)) {
        Some(direction) => {
            parts.pop();
            direction
        }
        None => Direction::Asc,
    };

    parts
        .into_iter()
        .map(|property| SortOrder {
            property: property.to_string(),
            direction,
        })
        .collect()
}

/// Find column by name
fn find_column<C>(column_name: &str, columns: &[(&str, C)]) -> Option<C>
where
    C: ColumnTrait + Copy,
{
    columns
        .iter()
        .find(|&&(col_name, _)| col_name == column_name)
        .map(|&(_, col)| col)
}
