//! Line to extension association rows (`line_extension`).

use rusqlite::Connection;
use tracing::info;

use crate::errors::DaoResult;
use crate::fixes::LineFixes;
use crate::models::LineExtension;
use crate::query::criteria::{criteria, find_all_by, find_by};
use crate::resources::{extension, line};
use crate::store::record;
use crate::store::session::with_savepoint;

pub fn find(conn: &Connection, line_id: i64, extension_id: i64) -> DaoResult<Option<LineExtension>> {
    find_by(
        conn,
        &criteria([("line_id", line_id), ("extension_id", extension_id)]),
    )
}

pub fn find_all_by_line(conn: &Connection, line_id: i64) -> DaoResult<Vec<LineExtension>> {
    find_all_by(conn, &criteria([("line_id", line_id)]))
}

/// Attach the extension; the line's first extension is its main one.
pub fn associate(conn: &Connection, line_id: i64, extension_id: i64) -> DaoResult<LineExtension> {
    with_savepoint(conn, "line_extension_associate", |conn| {
        line::get(conn, line_id)?;
        extension::get(conn, extension_id)?;
        if let Some(existing) = find(conn, line_id, extension_id)? {
            return Ok(existing);
        }
        let row = LineExtension {
            line_id,
            extension_id,
            main_extension: find_all_by_line(conn, line_id)?.is_empty(),
        };
        record::insert(conn, &row)?;
        info!(line_id, extension_id, main_extension = row.main_extension, "extension associated");
        LineFixes::new(conn).fix(line_id)?;
        Ok(row)
    })
}

pub fn dissociate(conn: &Connection, line_id: i64, extension_id: i64) -> DaoResult<()> {
    with_savepoint(conn, "line_extension_dissociate", |conn| {
        let Some(row) = find(conn, line_id, extension_id)? else {
            return Ok(());
        };
        record::delete(conn, &row)?;
        if row.main_extension {
            conn.execute(
                "UPDATE line_extension SET main_extension = 1
                 WHERE line_id = ?1 AND extension_id = (
                     SELECT MIN(extension_id) FROM line_extension WHERE line_id = ?1
                 );",
                [line_id],
            )?;
        }
        info!(line_id, extension_id, "extension dissociated");
        LineFixes::new(conn).fix(line_id)
    })
}
