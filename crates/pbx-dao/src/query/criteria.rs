//! Equality lookups by field name.
//!
//! Criteria are an ordered map of field name to value. A field is either a
//! column of the record or one of its declared relationship criteria.

use indexmap::IndexMap;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::errors::{DaoError, DaoResult};
use crate::store::record::{display_value, primary_key_order, select_list, Record};

pub type Criteria = IndexMap<String, Value>;

/// Build criteria from `(field, value)` pairs.
pub fn criteria<K, V, I>(pairs: I) -> Criteria
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// `field=value, ...` for error messages.
pub fn describe(criteria: &Criteria) -> String {
    criteria
        .iter()
        .map(|(k, v)| format!("{k}={}", display_value(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// WHERE clause accumulator
// ---------------------------------------------------------------------------

/// AND-ed predicates with their positional parameters, in bind order.
#[derive(Debug, Default, Clone)]
pub struct WhereClause {
    predicates: Vec<String>,
    params: Vec<Value>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// `expr = ?`, or `expr IS NULL` for a null value.
    pub fn push_eq(&mut self, expr: &str, value: Value) {
        if value == Value::Null {
            self.predicates.push(format!("{expr} IS NULL"));
        } else {
            self.predicates.push(format!("{expr} = ?"));
            self.params.push(value);
        }
    }

    pub fn push_raw(&mut self, predicate: String, params: impl IntoIterator<Item = Value>) {
        self.predicates.push(predicate);
        self.params.extend(params);
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Rendered clause with a leading space, or an empty string.
    pub fn sql(&self) -> String {
        if self.predicates.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.predicates.join(" AND "))
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Add one equality predicate per criteria entry.
///
/// Unknown field names fail with an input error naming all of them.
pub fn build_criteria<T: Record>(clause: &mut WhereClause, criteria: &Criteria) -> DaoResult<()> {
    let unknown: Vec<&str> = criteria
        .keys()
        .map(String::as_str)
        .filter(|key| !T::COLUMNS.contains(key) && relation::<T>(key).is_none())
        .collect();
    if !unknown.is_empty() {
        return Err(DaoError::unknown_keys(T::RESOURCE, &unknown));
    }

    for (key, value) in criteria {
        match relation::<T>(key) {
            Some(predicate) => {
                clause.push_raw(predicate.to_string(), [value.clone()]);
            }
            None => clause.push_eq(key, value.clone()),
        }
    }
    Ok(())
}

fn relation<T: Record>(key: &str) -> Option<&'static str> {
    T::RELATIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, predicate)| *predicate)
}

/// Run `SELECT <columns> FROM <table> <clause> <tail>` and map every row.
/// `tail_params` bind the placeholders of `tail`, after the clause's own.
pub fn fetch<T: Record>(
    conn: &Connection,
    clause: &WhereClause,
    tail: &str,
    tail_params: &[Value],
) -> DaoResult<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {}{}{};",
        select_list::<T>(),
        T::TABLE,
        clause.sql(),
        tail
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            params_from_iter(clause.params().iter().chain(tail_params)),
            T::from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Every row matching `criteria`, ordered by primary key.
pub fn find_all_by<T: Record>(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<T>> {
    let mut clause = WhereClause::new();
    build_criteria::<T>(&mut clause, criteria)?;
    debug!(resource = T::RESOURCE, criteria = %describe(criteria), "find_all_by");
    fetch(
        conn,
        &clause,
        &format!(" ORDER BY {}", primary_key_order::<T>()),
        &[],
    )
}

/// First row matching `criteria` by primary key order, if any.
pub fn find_by<T: Record>(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<T>> {
    let mut clause = WhereClause::new();
    build_criteria::<T>(&mut clause, criteria)?;
    let mut rows = fetch(
        conn,
        &clause,
        &format!(" ORDER BY {} LIMIT 1", primary_key_order::<T>()),
        &[],
    )?;
    Ok(rows.pop())
}

/// Like [`find_by`] but a miss is a `NotFound` error.
pub fn get_by<T: Record>(conn: &Connection, criteria: &Criteria) -> DaoResult<T> {
    find_by(conn, criteria)?.ok_or_else(|| DaoError::not_found(T::RESOURCE, describe(criteria)))
}
