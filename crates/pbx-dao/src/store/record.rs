//! Row mapping between typed records and their tables.
//!
//! A [`Record`] names its table, its columns in select order and its primary
//! key. The generic helpers here build the plain INSERT / UPDATE / DELETE
//! statements from that description; anything smarter lives with the
//! resource that needs it.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

use crate::errors::{DaoError, DaoResult};

pub trait Record: Sized {
    /// Resource name used in error messages.
    const RESOURCE: &'static str;
    const TABLE: &'static str;
    /// Column names, in the order `values` returns them.
    const COLUMNS: &'static [&'static str];
    const PRIMARY_KEY: &'static [&'static str] = &["id"];
    /// Whether the single `id` column is assigned by the database.
    const AUTO_ID: bool = true;
    /// Extra criteria keys that go through a relationship instead of a
    /// column. Each predicate holds exactly one `?` placeholder.
    const RELATIONS: &'static [(&'static str, &'static str)] = &[];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn values(&self) -> Vec<Value>;
}

/// Implements [`Record`] for a struct whose fields map 1:1 onto columns.
macro_rules! impl_record {
    (
        $ty:ident, $resource:literal, $table:literal,
        { $($field:ident => $col:literal),+ $(,)? }
        $(const $name:ident : $cty:ty = $cval:expr;)*
    ) => {
        impl $crate::store::record::Record for $ty {
            const RESOURCE: &'static str = $resource;
            const TABLE: &'static str = $table;
            const COLUMNS: &'static [&'static str] = &[$($col),+];
            $(const $name: $cty = $cval;)*

            fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
                Ok(Self {
                    $($field: row.get($col)?,)+
                })
            }

            fn values(&self) -> Vec<rusqlite::types::Value> {
                vec![$(rusqlite::types::Value::from(self.$field.clone())),+]
            }
        }
    };
}
pub(crate) use impl_record;

pub fn select_list<T: Record>() -> String {
    T::COLUMNS.join(", ")
}

/// `pk1 ASC, pk2 ASC` for stable ordering.
pub fn primary_key_order<T: Record>() -> String {
    T::PRIMARY_KEY
        .iter()
        .map(|col| format!("{col} ASC"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn primary_key_values<T: Record>(record: &T) -> DaoResult<Vec<Value>> {
    let values = record.values();
    T::PRIMARY_KEY
        .iter()
        .map(|pk| {
            T::COLUMNS
                .iter()
                .position(|col| col == pk)
                .map(|idx| values[idx].clone())
                .ok_or_else(|| {
                    DaoError::input(format!("{}: primary key {pk} is not a column", T::RESOURCE))
                })
        })
        .collect()
}

fn primary_key_predicate<T: Record>() -> String {
    T::PRIMARY_KEY
        .iter()
        .map(|pk| format!("{pk} = ?"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Insert `record`, skipping the `id` column when the database assigns it.
/// Returns the rowid of the new row.
pub fn insert<T: Record>(conn: &Connection, record: &T) -> DaoResult<i64> {
    let mut columns = Vec::with_capacity(T::COLUMNS.len());
    let mut values = Vec::with_capacity(T::COLUMNS.len());
    for (col, value) in T::COLUMNS.iter().zip(record.values()) {
        if T::AUTO_ID && *col == "id" {
            continue;
        }
        columns.push(*col);
        values.push(value);
    }
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({});",
        T::TABLE,
        columns.join(", "),
        placeholders
    );
    conn.execute(&sql, params_from_iter(values.iter()))?;
    Ok(conn.last_insert_rowid())
}

/// Write every non-key column of `record`. Fails with `NotFound` when no row
/// has its primary key.
pub fn update<T: Record>(conn: &Connection, record: &T) -> DaoResult<()> {
    let mut assignments = Vec::new();
    let mut values = Vec::new();
    for (col, value) in T::COLUMNS.iter().zip(record.values()) {
        if T::PRIMARY_KEY.contains(col) {
            continue;
        }
        assignments.push(format!("{col} = ?"));
        values.push(value);
    }
    let keys = primary_key_values(record)?;
    if assignments.is_empty() {
        return Ok(());
    }
    let sql = format!(
        "UPDATE {} SET {} WHERE {};",
        T::TABLE,
        assignments.join(", "),
        primary_key_predicate::<T>()
    );
    values.extend(keys.iter().cloned());
    let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
    if changed == 0 {
        return Err(DaoError::not_found(T::RESOURCE, describe_key::<T>(&keys)));
    }
    Ok(())
}

/// Delete the row with `record`'s primary key. Deleting a missing row is a
/// no-op.
pub fn delete<T: Record>(conn: &Connection, record: &T) -> DaoResult<()> {
    let keys = primary_key_values(record)?;
    let sql = format!(
        "DELETE FROM {} WHERE {};",
        T::TABLE,
        primary_key_predicate::<T>()
    );
    conn.execute(&sql, params_from_iter(keys.iter()))?;
    Ok(())
}

fn describe_key<T: Record>(keys: &[Value]) -> String {
    T::PRIMARY_KEY
        .iter()
        .zip(keys)
        .map(|(pk, value)| format!("{pk}={}", display_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Human-readable rendering of a bound value for error messages.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}
