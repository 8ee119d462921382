//! User to line association rows (`user_line`).
//!
//! A line has at most one main user and a user at most one main line. The
//! first association on either side takes the flag; removing the flagged
//! row hands it to the next row by id.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::errors::DaoResult;
use crate::fixes::{LineFixes, QueueMemberFixes};
use crate::models::UserLine;
use crate::query::criteria::{criteria, find_all_by, find_by};
use crate::resources::{line, user};
use crate::store::record;
use crate::store::session::with_savepoint;

pub fn find(conn: &Connection, user_id: i64, line_id: i64) -> DaoResult<Option<UserLine>> {
    find_by(conn, &criteria([("user_id", user_id), ("line_id", line_id)]))
}

pub fn find_all_by_line(conn: &Connection, line_id: i64) -> DaoResult<Vec<UserLine>> {
    find_all_by(conn, &criteria([("line_id", line_id)]))
}

pub fn find_all_by_user(conn: &Connection, user_id: i64) -> DaoResult<Vec<UserLine>> {
    find_all_by(conn, &criteria([("user_id", user_id)]))
}

/// Attach the line to the user. Associating twice returns the existing row.
pub fn associate(conn: &Connection, user_id: i64, line_id: i64) -> DaoResult<UserLine> {
    with_savepoint(conn, "user_line_associate", |conn| {
        user::get(conn, user_id)?;
        line::get(conn, line_id)?;
        if let Some(existing) = find(conn, user_id, line_id)? {
            return Ok(existing);
        }
        let row = UserLine {
            user_id,
            line_id,
            main_user: find_all_by_line(conn, line_id)?.is_empty(),
            main_line: find_all_by_user(conn, user_id)?.is_empty(),
        };
        record::insert(conn, &row)?;
        info!(user_id, line_id, main_user = row.main_user, main_line = row.main_line, "line associated");

        LineFixes::new(conn).fix(line_id)?;
        QueueMemberFixes::new(conn).fix_user(user_id)?;
        Ok(row)
    })
}

pub fn dissociate(conn: &Connection, user_id: i64, line_id: i64) -> DaoResult<()> {
    with_savepoint(conn, "user_line_dissociate", |conn| {
        let Some(row) = find(conn, user_id, line_id)? else {
            return Ok(());
        };
        record::delete(conn, &row)?;
        info!(user_id, line_id, "line dissociated");

        ensure_main_user(conn, line_id)?;
        ensure_main_line(conn, user_id)?;
        LineFixes::new(conn).fix(line_id)?;
        QueueMemberFixes::new(conn).fix_user(user_id)
    })
}

/// Flag the first remaining user of the line as main user when none is.
pub(crate) fn ensure_main_user(conn: &Connection, line_id: i64) -> DaoResult<()> {
    let has_main: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM user_line WHERE line_id = ?1 AND main_user = 1);",
        [line_id],
        |row| row.get(0),
    )?;
    if has_main {
        return Ok(());
    }
    let next: Option<i64> = conn
        .query_row(
            "SELECT user_id FROM user_line WHERE line_id = ?1 ORDER BY user_id ASC LIMIT 1;",
            [line_id],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(user_id) = next {
        conn.execute(
            "UPDATE user_line SET main_user = 1 WHERE user_id = ?1 AND line_id = ?2;",
            [user_id, line_id],
        )?;
        info!(user_id, line_id, "main user promoted");
    }
    Ok(())
}

fn ensure_main_line(conn: &Connection, user_id: i64) -> DaoResult<()> {
    let has_main: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM user_line WHERE user_id = ?1 AND main_line = 1);",
        [user_id],
        |row| row.get(0),
    )?;
    if !has_main {
        conn.execute(
            "UPDATE user_line SET main_line = 1
             WHERE user_id = ?1 AND line_id = (
                 SELECT MIN(line_id) FROM user_line WHERE user_id = ?1
             );",
            [user_id],
        )?;
    }
    Ok(())
}
