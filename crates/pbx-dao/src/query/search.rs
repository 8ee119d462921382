//! Generic filtered, searched, sorted and paginated listing.
//!
//! A [`SearchConfig`] maps the logical keys callers use onto column
//! expressions of one table. [`SearchSystem::search`] turns
//! [`SearchParameters`] into a count query and a page query sharing the same
//! WHERE clause, so `total` never depends on the offset or limit.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use indexmap::IndexMap;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{DaoError, DaoResult};
use crate::query::criteria::{fetch, WhereClause};
use crate::query::guards::{contains_pattern, truncate_term, LIKE_ESCAPE, MAX_SEARCH_TERM_LENGTH};
use crate::store::record::Record;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = DaoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(DaoError::input(format!(
                "direction must be asc or desc, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("asc"),
            Direction::Desc => f.write_str("desc"),
        }
    }
}

// ---------------------------------------------------------------------------
// SearchConfig
// ---------------------------------------------------------------------------

/// Immutable description of what a resource search may filter, match and
/// sort on.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    table: &'static str,
    columns: IndexMap<&'static str, &'static str>,
    searchable: Vec<&'static str>,
    default_sort: &'static str,
    primary_key: &'static [&'static str],
    max_term_length: usize,
}

impl SearchConfig {
    pub fn builder(table: &'static str) -> SearchConfigBuilder {
        SearchConfigBuilder {
            table,
            columns: Vec::new(),
            searchable: Vec::new(),
            default_sort: None,
            primary_key: &["id"],
            max_term_length: MAX_SEARCH_TERM_LENGTH,
        }
    }

    /// Builder preset with the table and primary key of `T`.
    pub fn for_record<T: Record>() -> SearchConfigBuilder {
        Self::builder(T::TABLE).primary_key(T::PRIMARY_KEY)
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn column_for(&self, key: &str) -> Option<&'static str> {
        self.columns.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.keys().copied()
    }

    pub fn searchable(&self) -> &[&'static str] {
        &self.searchable
    }

    pub fn default_sort(&self) -> &'static str {
        self.default_sort
    }
}

pub struct SearchConfigBuilder {
    table: &'static str,
    columns: Vec<(&'static str, &'static str)>,
    searchable: Vec<&'static str>,
    default_sort: Option<&'static str>,
    primary_key: &'static [&'static str],
    max_term_length: usize,
}

impl SearchConfigBuilder {
    /// Map the logical `key` to the column expression `expr`.
    pub fn column(mut self, key: &'static str, expr: &'static str) -> Self {
        self.columns.push((key, expr));
        self
    }

    /// Map each key to the column of the same name.
    pub fn columns(mut self, keys: &[&'static str]) -> Self {
        self.columns.extend(keys.iter().map(|k| (*k, *k)));
        self
    }

    pub fn searchable(mut self, keys: &[&'static str]) -> Self {
        self.searchable.extend_from_slice(keys);
        self
    }

    pub fn default_sort(mut self, key: &'static str) -> Self {
        self.default_sort = Some(key);
        self
    }

    pub fn primary_key(mut self, columns: &'static [&'static str]) -> Self {
        self.primary_key = columns;
        self
    }

    /// Longest search term kept, in characters.
    pub fn max_term_length(mut self, max_chars: usize) -> Self {
        self.max_term_length = max_chars;
        self
    }

    pub fn build(self) -> DaoResult<SearchConfig> {
        if self.columns.is_empty() {
            return Err(DaoError::input(format!(
                "search config for {} has no columns",
                self.table
            )));
        }
        let mut columns = IndexMap::with_capacity(self.columns.len());
        for (key, expr) in self.columns {
            if columns.insert(key, expr).is_some() {
                return Err(DaoError::input(format!(
                    "search config for {}: duplicate key {key}",
                    self.table
                )));
            }
        }
        let default_sort = self.default_sort.ok_or_else(|| {
            DaoError::input(format!("search config for {} has no default sort", self.table))
        })?;
        if !columns.contains_key(default_sort) {
            return Err(DaoError::input(format!(
                "search config for {}: default sort {default_sort} is not a column",
                self.table
            )));
        }
        if self.searchable.is_empty() {
            return Err(DaoError::input(format!(
                "search config for {} has no searchable columns",
                self.table
            )));
        }
        let missing: Vec<&str> = self
            .searchable
            .iter()
            .copied()
            .filter(|key| !columns.contains_key(key))
            .collect();
        if !missing.is_empty() {
            return Err(DaoError::input(format!(
                "search config for {}: searchable key(s) not in columns: {}",
                self.table,
                missing.join(", ")
            )));
        }
        if self.primary_key.is_empty() {
            return Err(DaoError::input(format!(
                "search config for {} has no primary key",
                self.table
            )));
        }
        Ok(SearchConfig {
            table: self.table,
            columns,
            searchable: self.searchable,
            default_sort,
            primary_key: self.primary_key,
            max_term_length: self.max_term_length,
        })
    }
}

// ---------------------------------------------------------------------------
// SearchParameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParameters {
    pub search: Option<String>,
    pub filters: IndexMap<String, Value>,
    pub order: Option<String>,
    pub direction: Direction,
    pub offset: u64,
    pub limit: Option<u64>,
}

impl SearchParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Text filter; `&str` has no direct `Value` conversion.
    pub fn filter_text(self, key: impl Into<String>, value: &str) -> Self {
        self.filter(key, value.to_string())
    }

    pub fn order(mut self, key: impl Into<String>) -> Self {
        self.order = Some(key.into());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Parse loosely typed parameters: `search`, `order`, `direction`,
    /// `offset` (or `skip`), `limit`; every other key is an exact-match
    /// filter.
    pub fn from_json(map: &serde_json::Map<String, serde_json::Value>) -> DaoResult<Self> {
        let mut params = SearchParameters::default();
        for (key, raw) in map {
            match key.as_str() {
                "search" => params.search = optional_string(key, raw)?,
                "order" => params.order = optional_string(key, raw)?,
                "direction" => {
                    if let Some(dir) = optional_string(key, raw)? {
                        params.direction = dir.parse()?;
                    }
                }
                "offset" | "skip" => {
                    params.offset = optional_count(key, raw)?.unwrap_or(0);
                }
                "limit" => params.limit = optional_count(key, raw)?,
                _ => {
                    params.filters.insert(key.clone(), filter_value(key, raw)?);
                }
            }
        }
        Ok(params)
    }
}

fn optional_string(key: &str, raw: &serde_json::Value) -> DaoResult<Option<String>> {
    match raw {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s.clone())),
        other => Err(DaoError::input(format!("{key} must be a string, got {other}"))),
    }
}

fn optional_count(key: &str, raw: &serde_json::Value) -> DaoResult<Option<u64>> {
    match raw {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| DaoError::input(format!("{key} must be a positive number, got {n}"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| DaoError::input(format!("{key} must be a positive number, got {s:?}"))),
        other => Err(DaoError::input(format!(
            "{key} must be a positive number, got {other}"
        ))),
    }
}

fn filter_value(key: &str, raw: &serde_json::Value) -> DaoResult<Value> {
    match raw {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Integer(i64::from(*b))),
        serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Real(f))
            } else {
                Err(DaoError::input(format!("filter {key}: unsupported number {n}")))
            }
        }
        other => Err(DaoError::input(format!(
            "filter {key} must be a scalar, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// SearchResult / SearchSystem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<T> {
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> SearchResult<T> {
    pub fn empty() -> Self {
        Self {
            total: 0,
            items: Vec::new(),
        }
    }
}

/// Search engine bound to one record type.
pub struct SearchSystem<T> {
    config: SearchConfig,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> SearchSystem<T> {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            _record: PhantomData,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn search(&self, conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<T>> {
        let config = &self.config;

        let mut unknown: Vec<&str> = params
            .filters
            .keys()
            .map(String::as_str)
            .filter(|key| config.column_for(key).is_none())
            .collect();
        if let Some(order) = params.order.as_deref() {
            if config.column_for(order).is_none() {
                unknown.push(order);
            }
        }
        if !unknown.is_empty() {
            return Err(DaoError::unknown_keys(T::RESOURCE, &unknown));
        }

        let clause = self.where_clause(params);
        let sort_key = params.order.as_deref().unwrap_or(config.default_sort);
        let sort_expr = config.column_for(sort_key).unwrap_or(sort_key);

        debug!(
            resource = T::RESOURCE,
            filters = params.filters.len(),
            search = params.search.as_deref().unwrap_or(""),
            order = sort_key,
            direction = %params.direction,
            offset = params.offset,
            limit = ?params.limit,
            "search"
        );

        let count_sql = format!("SELECT COUNT(*) FROM {}{};", T::TABLE, clause.sql());
        let total: i64 = conn.query_row(&count_sql, params_from_iter(clause.params().iter()), |row| {
            row.get(0)
        })?;
        let total = u64::try_from(total).unwrap_or(0);

        if total == 0 || params.limit == Some(0) || params.offset >= total {
            return Ok(SearchResult {
                total,
                items: Vec::new(),
            });
        }

        let tie_break = config
            .primary_key
            .iter()
            .map(|pk| format!("{pk} ASC"))
            .collect::<Vec<_>>()
            .join(", ");
        let limit = params
            .limit
            .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
            .unwrap_or(-1);
        let offset = i64::try_from(params.offset).unwrap_or(i64::MAX);

        let tail = format!(
            " ORDER BY ({sort_expr}) IS NULL, {sort_expr} {}, {tie_break} LIMIT ? OFFSET ?",
            params.direction.as_sql()
        );
        let items = fetch(
            conn,
            &clause,
            &tail,
            &[Value::Integer(limit), Value::Integer(offset)],
        )?;

        Ok(SearchResult { total, items })
    }

    fn where_clause(&self, params: &SearchParameters) -> WhereClause {
        let config = &self.config;
        let mut clause = WhereClause::new();
        for (key, value) in &params.filters {
            if let Some(expr) = config.column_for(key) {
                clause.push_eq(expr, value.clone());
            }
        }

        let term = params
            .search
            .as_deref()
            .map(|t| truncate_term(t, config.max_term_length))
            .unwrap_or_default();
        if !term.is_empty() {
            let pattern = contains_pattern(&term);
            let matches: Vec<String> = config
                .searchable
                .iter()
                .filter_map(|key| config.column_for(key))
                .map(|expr| format!("CAST({expr} AS TEXT) LIKE ? ESCAPE '{LIKE_ESCAPE}'"))
                .collect();
            let binds = vec![Value::Text(pattern); matches.len()];
            clause.push_raw(format!("({})", matches.join(" OR ")), binds);
        }
        clause
    }
}
