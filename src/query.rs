use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::error::ApiError;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// Listing parameters extracted from the query string
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Case-insensitive partial name match
    pub name: Option<String>,
    /// Only records belonging to this destination id
    pub destination: Option<i32>,
    /// `field:asc` or `field:desc`, e.g. `ratingsAverage:desc`
    pub sort_by: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 10, at most 100)
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    RatingsAverage,
    RatingsQuantity,
    CreatedAt,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::RatingsAverage => "ratings_average",
            SortField::RatingsQuantity => "ratings_quantity",
            SortField::CreatedAt => "created_at",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(SortField::Name),
            "ratingsAverage" => Some(SortField::RatingsAverage),
            "ratingsQuantity" => Some(SortField::RatingsQuantity),
            "createdAt" => Some(SortField::CreatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Validated listing query with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub name: Option<String>,
    pub destination_id: Option<i32>,
    pub attraction_id: Option<i32>,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            name: None,
            destination_id: None,
            attraction_id: None,
            sort_field: SortField::CreatedAt,
            sort_order: SortOrder::Asc,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListQuery {
    /// The five best rated attractions
    pub fn top_rated(limit: u32) -> Self {
        Self {
            sort_field: SortField::RatingsAverage,
            sort_order: SortOrder::Desc,
            limit,
            ..Self::default()
        }
    }

    /// Rows skipped before this page; computed in `u64` so no page overflows
    pub fn offset(&self) -> u64 {
        page_offset(self.page, self.limit)
    }
}

fn page_offset(page: u32, limit: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(limit)
}

/// One page of results plus totals
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub total_results: i64,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, query: &ListQuery, total_results: i64) -> Self {
        let limit = i64::from(query.limit);
        let total_pages = ((total_results + limit - 1) / limit).max(0) as u32;
        Self {
            results,
            page: query.page,
            limit: query.limit,
            total_pages,
            total_results,
        }
    }
}

/// Query parameter validator
pub struct QueryValidator;

impl QueryValidator {
    /// Validates listing parameters; `sortable` lists the fields the
    /// target table supports
    pub fn validate(params: ListParams, sortable: &[SortField]) -> Result<ListQuery, ApiError> {
        let name = params
            .name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let (sort_field, sort_order) = match params.sort_by {
            Some(raw) => Self::parse_sort_by(&raw, sortable)?,
            None => (SortField::CreatedAt, SortOrder::Asc),
        };

        let page = params.page.unwrap_or(DEFAULT_PAGE);
        if page == 0 {
            return Err(ApiError::bad_request("page must be a positive number (greater than 0)"));
        }

        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(ApiError::bad_request(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        Ok(ListQuery {
            name,
            destination_id: params.destination,
            attraction_id: None,
            sort_field,
            sort_order,
            page,
            limit,
        })
    }

    fn parse_sort_by(raw: &str, sortable: &[SortField]) -> Result<(SortField, SortOrder), ApiError> {
        let (field, order) = match raw.split_once(':') {
            Some((field, order)) => (field, Some(order)),
            None => (raw, None),
        };

        let field = SortField::parse(field)
            .filter(|f| sortable.contains(f))
            .ok_or_else(|| ApiError::bad_request(format!("Invalid sort field '{}'", field)))?;

        let order = match order {
            None | Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(other) => {
                return Err(ApiError::bad_request(format!(
                    "Invalid sort order '{}'. Must be 'asc' or 'desc'",
                    other
                )))
            }
        };

        Ok((field, order))
    }
}

/// Escapes LIKE wildcards so user input is matched as plain text
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A value bound to a positional parameter
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Int(i32),
}

/// SQL builder for listing queries with filters, sorting and pagination
pub struct SqlQueryBuilder {
    table: &'static str,
    columns: &'static str,
    where_clauses: Vec<String>,
    params: Vec<BindValue>,
    order_clause: String,
    limit: u32,
    offset: u64,
}

impl SqlQueryBuilder {
    pub fn new(table: &'static str, columns: &'static str) -> Self {
        Self {
            table,
            columns,
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_clause: "id ASC".to_string(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    /// Applies every filter, the sort and the page of a validated query
    pub fn from_query(table: &'static str, columns: &'static str, query: &ListQuery) -> Self {
        let mut builder = Self::new(table, columns);
        if let Some(name) = &query.name {
            builder.add_name_filter(name);
        }
        if let Some(destination_id) = query.destination_id {
            builder.add_destination_filter(destination_id);
        }
        if let Some(attraction_id) = query.attraction_id {
            builder.add_attraction_filter(attraction_id);
        }
        builder.set_sort(query.sort_field, query.sort_order);
        builder.set_pagination(query.page, query.limit);
        builder
    }

    /// Partial name match, case-insensitive; `%`, `_` and `\` match literally
    pub fn add_name_filter(&mut self, name: &str) {
        let param_index = self.params.len() + 1;
        self.where_clauses
            .push(format!("name ILIKE ${} ESCAPE '\\'", param_index));
        self.params
            .push(BindValue::Text(format!("%{}%", escape_like(name))));
    }

    pub fn add_destination_filter(&mut self, destination_id: i32) {
        let param_index = self.params.len() + 1;
        self.where_clauses.push(format!("destination_id = ${}", param_index));
        self.params.push(BindValue::Int(destination_id));
    }

    /// Sort by the given field; id breaks ties so pages are stable
    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        let order_str = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        self.order_clause = format!("{} {}, id ASC", field.column(), order_str);
    }

    pub fn add_attraction_filter(&mut self, attraction_id: i32) {
        let param_index = self.params.len() + 1;
        self.where_clauses.push(format!("attraction_id = ${}", param_index));
        self.params.push(BindValue::Int(attraction_id));
    }

    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = page_offset(page, limit);
    }

    fn where_sql(&self) -> String {
        if self.where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.where_clauses.join(" AND "))
        }
    }

    /// Page query and its bound parameters
    pub fn build(&self) -> (String, Vec<BindValue>) {
        let query = format!(
            "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
            self.columns,
            self.table,
            self.where_sql(),
            self.order_clause,
            self.limit,
            self.offset
        );
        (query, self.params.clone())
    }

    /// Total-count query with the same filters
    pub fn build_count(&self) -> (String, Vec<BindValue>) {
        let query = format!("SELECT COUNT(*) FROM {}{}", self.table, self.where_sql());
        (query, self.params.clone())
    }
}
