use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::errors::DaoResult;
use crate::models::{Extension, QueueMember, ResolvedEndpoint, MEMBER_USER};
use crate::query::criteria::{criteria, find_all_by};
use crate::resources::{line, queue};
use crate::store::record;
use crate::store::session::with_savepoint;

/// Recomputes the cached `channel` and `interface` of user queue members.
pub struct QueueMemberFixes<'c> {
    conn: &'c Connection,
}

impl<'c> QueueMemberFixes<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Fix one member row. Agent members and users without a resolvable
    /// main line are left as they are.
    pub fn fix(&self, member_id: i64) -> DaoResult<()> {
        with_savepoint(self.conn, "queue_member_fixes", |conn| {
            let Some(mut member) = queue::find_member(conn, member_id)? else {
                return Ok(());
            };
            if !member.is_user() {
                return Ok(());
            }
            let Some(line_id) = main_line_id(conn, member.userid)? else {
                return Ok(());
            };
            let line = line::get(conn, line_id)?;
            let resolution = line::resolve_endpoint(conn, &line)?;
            let Some(endpoint) = resolution.resolved() else {
                return Ok(());
            };
            let extension = line::main_extension(conn, line_id)?;
            save_member(conn, &mut member, endpoint, extension.as_ref())
        })
    }

    /// Fix every user member row of `user_id`.
    pub fn fix_user(&self, user_id: i64) -> DaoResult<()> {
        with_savepoint(self.conn, "queue_member_user_fixes", |conn| {
            for member in user_members(conn, user_id)? {
                QueueMemberFixes::new(conn).fix(member.id)?;
            }
            Ok(())
        })
    }
}

/// First line flagged main line for the user.
pub(crate) fn main_line_id(conn: &Connection, user_id: i64) -> DaoResult<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT line_id FROM user_line WHERE user_id = ?1 AND main_line = 1
             ORDER BY line_id ASC LIMIT 1;",
            [user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub(crate) fn user_members(conn: &Connection, user_id: i64) -> DaoResult<Vec<QueueMember>> {
    find_all_by(
        conn,
        &criteria([
            ("usertype", Value::Text(MEMBER_USER.to_string())),
            ("userid", Value::Integer(user_id)),
        ]),
    )
}

/// Rewrite `member` from the endpoint and extension of its user's main line.
/// Returns whether anything changed.
pub(crate) fn apply_line(
    member: &mut QueueMember,
    endpoint: &ResolvedEndpoint,
    extension: Option<&Extension>,
) -> bool {
    let before = (member.channel.clone(), member.interface.clone());
    if member.is_local() {
        if let Some(ext) = extension {
            member.interface = format!("Local/{}@{}", ext.exten, ext.context);
        }
    } else {
        member.channel = endpoint.channel().to_string();
        if let Some(interface) = endpoint.interface() {
            member.interface = interface;
        }
    }
    before != (member.channel.clone(), member.interface.clone())
}

pub(crate) fn save_member(
    conn: &Connection,
    member: &mut QueueMember,
    endpoint: &ResolvedEndpoint,
    extension: Option<&Extension>,
) -> DaoResult<()> {
    if apply_line(member, endpoint, extension) {
        debug!(
            member_id = member.id,
            queue = %member.queue_name,
            interface = %member.interface,
            channel = %member.channel,
            "queue member rewritten"
        );
        record::update(conn, member)?;
    }
    Ok(())
}
