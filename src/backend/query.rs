//! Request descriptions in the PostgREST query dialect.
//!
//! A [`Query`] only describes what to read or modify; turning it into HTTP is
//! the client's job. Keeping it a plain value lets fakes inspect and route it.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsValue {
    Null,
    True,
    False,
}

impl IsValue {
    fn as_str(&self) -> &'static str {
        match self {
            IsValue::Null => "null",
            IsValue::True => "true",
            IsValue::False => "false",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(String, String),
    Neq(String, String),
    In(String, Vec<String>),
    /// Array column contains every listed value (`cs`).
    Contains(String, Vec<String>),
    Is(String, IsValue),
    /// Case-insensitive pattern; `*` is the wildcard.
    ILike(String, String),
    Or(Vec<Filter>),
}

impl Filter {
    /// Operator and operand, e.g. `eq.active` or `in.(a,b)`.
    fn operand(&self, nested: bool) -> String {
        match self {
            Filter::Eq(_, v) => format!("eq.{}", maybe_quote(v, nested)),
            Filter::Neq(_, v) => format!("neq.{}", maybe_quote(v, nested)),
            Filter::In(_, vs) => format!("in.({})", join_quoted(vs)),
            Filter::Contains(_, vs) => format!("cs.{{{}}}", join_quoted(vs)),
            Filter::Is(_, v) => format!("is.{}", v.as_str()),
            Filter::ILike(_, p) => format!("ilike.{}", maybe_quote(p, nested)),
            Filter::Or(inner) => {
                let parts: Vec<String> = inner.iter().map(Filter::nested_form).collect();
                format!("({})", parts.join(","))
            }
        }
    }

    fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _)
            | Filter::Neq(c, _)
            | Filter::In(c, _)
            | Filter::Contains(c, _)
            | Filter::Is(c, _)
            | Filter::ILike(c, _) => c,
            Filter::Or(_) => "or",
        }
    }

    fn nested_form(&self) -> String {
        match self {
            Filter::Or(_) => format!("or{}", self.operand(true)),
            other => format!("{}.{}", other.column(), other.operand(true)),
        }
    }

    /// Query-string pair for a top-level filter.
    pub fn to_param(&self) -> (String, String) {
        (self.column().to_string(), self.operand(false))
    }
}

const RESERVED: &[char] = &[',', '.', ':', '(', ')', '{', '}', '"', '\\', ' '];

/// Values inside `in.(...)`, `cs.{...}` and `or=(...)` must be double-quoted
/// when they contain PostgREST delimiters.
fn quote(value: &str) -> String {
    if value.contains(RESERVED) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", escaped)
    } else {
        value.to_string()
    }
}

fn maybe_quote(value: &str, nested: bool) -> String {
    if nested {
        quote(value)
    } else {
        value.to_string()
    }
}

fn join_quoted(values: &[String]) -> String {
    values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(",")
}

/// A filtered, ordered read (or the filter part of an update/delete).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: String,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<(String, Order)>,
    pub limit: Option<usize>,
    pub single: bool,
}

impl Query {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
            single: false,
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(Filter::Eq(column.to_string(), value.to_string()))
    }

    pub fn neq(self, column: &str, value: impl ToString) -> Self {
        self.filter(Filter::Neq(column.to_string(), value.to_string()))
    }

    pub fn is_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.filter(Filter::In(column.to_string(), values))
    }

    pub fn ilike(self, column: &str, pattern: &str) -> Self {
        self.filter(Filter::ILike(column.to_string(), pattern.to_string()))
    }

    pub fn or(self, filters: Vec<Filter>) -> Self {
        self.filter(Filter::Or(filters))
    }

    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.order = Some((column.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Ask the backend for exactly one object instead of an array.
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    /// Value of the first top-level `eq` filter on `column`.
    pub fn eq_value(&self, column: &str) -> Option<&str> {
        self.filters.iter().find_map(|f| match f {
            Filter::Eq(c, v) if c == column => Some(v.as_str()),
            _ => None,
        })
    }

    /// Encode as query-string pairs. `with_select` is false for requests
    /// that return no representation (deletes).
    pub fn to_params(&self, with_select: bool) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 3);
        if with_select {
            params.push(("select".to_string(), self.columns.clone()));
        }
        params.extend(self.filters.iter().map(Filter::to_param));
        if let Some((column, order)) = &self.order {
            let dir = match order {
                Order::Ascending => "asc",
                Order::Descending => "desc",
            };
            params.push(("order".to_string(), format!("{}.{}", column, dir)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// One backend round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Select(Query),
    Insert {
        table: String,
        row: Value,
        single: bool,
    },
    Update {
        query: Query,
        patch: Value,
    },
    Delete(Query),
    /// Number of rows matching the query, counted by the server.
    Count(Query),
    Rpc {
        name: String,
        args: Value,
    },
}

impl Request {
    pub fn insert(table: &str, row: Value) -> Self {
        Request::Insert {
            table: table.to_string(),
            row,
            single: true,
        }
    }

    pub fn rpc(name: &str, args: Value) -> Self {
        Request::Rpc {
            name: name.to_string(),
            args,
        }
    }

    /// Target table, or the procedure name for RPCs.
    pub fn target(&self) -> &str {
        match self {
            Request::Select(q) | Request::Delete(q) | Request::Count(q) => &q.table,
            Request::Update { query, .. } => &query.table,
            Request::Insert { table, .. } => table,
            Request::Rpc { name, .. } => name,
        }
    }
}
