//! Table query builder with structured filters.
//!
//! Filters are kept as data rather than strings so the same query can be
//! rendered to PostgREST query parameters for the REST backend or evaluated
//! directly against JSON rows by the in-memory backend. Builder methods return
//! `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use storefront_sdk::QueryBuilder;
//! let params = QueryBuilder::new("products")
//!     .eq("category_id", "3")
//!     .ilike("name", "%lamp%")
//!     .order_by("price", false)
//!     .limit(10)
//!     .build();
//! assert!(params.contains(&("category_id".to_string(), "eq.3".to_string())));
//! ```

use std::cmp::Ordering;

use serde_json::Value;

/// Comparison applied by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gte,
    Lte,
    /// Case-insensitive pattern match where `%` (or `*`) matches any run of characters.
    ILike,
    In,
}

impl FilterOp {
    fn operator(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::ILike => "ilike",
            Self::In => "in",
        }
    }
}

/// A single column condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub values: Vec<String>,
}

impl Filter {
    /// Render as a PostgREST `(column, "op.value")` query parameter.
    pub fn to_param(&self) -> (String, String) {
        let rendered = match self.op {
            FilterOp::In => {
                let quoted: Vec<String> = self.values.iter().map(|v| quote_list_value(v)).collect();
                format!("in.({})", quoted.join(","))
            }
            FilterOp::ILike => format!("ilike.{}", self.first().replace('%', "*")),
            op => format!("{}.{}", op.operator(), self.first()),
        };
        (self.column.clone(), rendered)
    }

    /// Evaluate the condition against a JSON row. Missing columns read as null.
    pub fn matches(&self, row: &Value) -> bool {
        let field = row.get(&self.column).unwrap_or(&Value::Null);
        match self.op {
            FilterOp::Eq => value_eq(field, self.first()),
            FilterOp::Neq => !value_eq(field, self.first()),
            FilterOp::Gte => compare(field, self.first()).is_some_and(|o| o != Ordering::Less),
            FilterOp::Lte => compare(field, self.first()).is_some_and(|o| o != Ordering::Greater),
            FilterOp::ILike => field
                .as_str()
                .is_some_and(|text| like_match(text, self.first())),
            FilterOp::In => self.values.iter().any(|v| value_eq(field, v)),
        }
    }

    fn first(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// Builds table queries for a [`Backend`](crate::backend::Backend).
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    select_cols: Vec<String>,
    filters: Vec<Filter>,
    order_by: Vec<OrderBy>,
    limit_val: Option<usize>,
    offset_val: Option<usize>,
}

impl QueryBuilder {
    /// Create a builder targeting the given table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            select_cols: vec!["*".to_string()],
            filters: Vec::new(),
            order_by: Vec::new(),
            limit_val: None,
            offset_val: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Set the columns to return (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add an arbitrary condition.
    pub fn filter(&mut self, column: &str, op: FilterOp, values: &[&str]) -> &mut Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op,
            values: values.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    pub fn eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.filter(column, FilterOp::Eq, &[value])
    }

    pub fn neq(&mut self, column: &str, value: &str) -> &mut Self {
        self.filter(column, FilterOp::Neq, &[value])
    }

    pub fn gte(&mut self, column: &str, value: &str) -> &mut Self {
        self.filter(column, FilterOp::Gte, &[value])
    }

    pub fn lte(&mut self, column: &str, value: &str) -> &mut Self {
        self.filter(column, FilterOp::Lte, &[value])
    }

    /// Add a case-insensitive pattern condition (`%` is the wildcard).
    pub fn ilike(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.filter(column, FilterOp::ILike, &[pattern])
    }

    /// Add an IN condition. An empty list matches nothing.
    pub fn in_list(&mut self, column: &str, values: &[&str]) -> &mut Self {
        self.filter(column, FilterOp::In, values)
    }

    /// Add an ORDER BY key. Keys apply in the order they are added.
    pub fn order_by(&mut self, column: &str, ascending: bool) -> &mut Self {
        self.order_by.push(OrderBy {
            column: column.to_string(),
            ascending,
        });
        self
    }

    /// Set the maximum number of rows to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Set the number of rows to skip before returning results.
    pub fn offset(&mut self, n: usize) -> &mut Self {
        self.offset_val = Some(n);
        self
    }

    /// Build the PostgREST query parameters.
    pub fn build(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select_cols.join(","))];

        params.extend(self.filters.iter().map(Filter::to_param));

        if !self.order_by.is_empty() {
            let keys: Vec<String> = self
                .order_by
                .iter()
                .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
                .collect();
            params.push(("order".to_string(), keys.join(",")));
        }

        if let Some(n) = self.limit_val {
            params.push(("limit".to_string(), n.to_string()));
        }

        if let Some(n) = self.offset_val {
            params.push(("offset".to_string(), n.to_string()));
        }

        params
    }

    /// Build only the filter parameters, for PATCH and DELETE requests.
    pub fn build_filters(&self) -> Vec<(String, String)> {
        self.filters.iter().map(Filter::to_param).collect()
    }

    /// Whether a row satisfies every filter.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Evaluate the whole query (filters, ordering, offset, limit and column
    /// selection) against a set of rows.
    pub fn apply(&self, rows: &[Value]) -> Vec<Value> {
        let mut selected: Vec<&Value> = rows.iter().filter(|r| self.matches(r)).collect();

        if !self.order_by.is_empty() {
            selected.sort_by(|a, b| {
                for key in &self.order_by {
                    let ord = compare_fields(
                        a.get(&key.column).unwrap_or(&Value::Null),
                        b.get(&key.column).unwrap_or(&Value::Null),
                        key.ascending,
                    );
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        let skip = self.offset_val.unwrap_or(0);
        let take = self.limit_val.unwrap_or(usize::MAX);

        selected
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|row| self.project(row))
            .collect()
    }

    fn project(&self, row: &Value) -> Value {
        if self.select_cols.iter().any(|c| c == "*") {
            return row.clone();
        }
        match row {
            Value::Object(map) => Value::Object(
                map.iter()
                    .filter(|(k, _)| self.select_cols.iter().any(|c| c == *k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

fn quote_list_value(value: &str) -> String {
    if value.contains([',', '(', ')', '"', ' ', '.', ':']) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

fn scalar_text(field: &Value) -> Option<String> {
    match field {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Compare a row field against a filter value. Numeric when both sides parse
/// as numbers (decimals are stored as strings), lexical otherwise.
fn compare(field: &Value, value: &str) -> Option<Ordering> {
    let text = scalar_text(field)?;
    match (parse_number(&text), parse_number(value)) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => Some(text.as_str().cmp(value)),
    }
}

/// Parse plain decimal numbers only, so words like `inf` or `NaN` stay text.
fn parse_number(text: &str) -> Option<f64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    text.parse().ok()
}

fn value_eq(field: &Value, value: &str) -> bool {
    if field.is_null() {
        return value == "null";
    }
    compare(field, value) == Some(Ordering::Equal)
}

/// Ordering between two row fields. Nulls sort last in both directions.
fn compare_fields(a: &Value, b: &Value, ascending: bool) -> Ordering {
    match (scalar_text(a), scalar_text(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = match (parse_number(&x), parse_number(&y)) {
                (Some(p), Some(q)) => p.partial_cmp(&q).unwrap_or(Ordering::Equal),
                _ => x.cmp(&y),
            };
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
    }
}

fn like_match(text: &str, pattern: &str) -> bool {
    let text = text.to_lowercase();
    let pattern = pattern.to_lowercase().replace('*', "%");
    let parts: Vec<&str> = pattern.split('%').collect();

    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return text.is_empty(),
    };
    let Some((last, middle)) = rest.split_last() else {
        return text == *first;
    };

    if !text.starts_with(first) {
        return false;
    }
    let mut pos = first.len();

    for part in middle {
        if part.is_empty() {
            continue;
        }
        match text[pos..].find(part) {
            Some(i) => pos += i + part.len(),
            None => return false,
        }
    }

    text.len() >= pos + last.len() && text[pos..].ends_with(last)
}
