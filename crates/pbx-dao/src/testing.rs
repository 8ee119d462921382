//! Shared fixtures for unit tests: an in-memory database with the full
//! schema, and `add_*` helpers that insert a row and return it as stored.

use rusqlite::Connection;

use crate::models::{
    CustomEndpoint, Extension, IaxEndpoint, Line, LineExtension, QueueMember, RegisterIax,
    RegisterSip, SccpEndpoint, SipEndpoint, Trunk, User, UserLine, CATEGORY_QUEUE, MEMBER_USER,
};
use crate::resources;
use crate::store::record::{self, Record};
use crate::store::schema;

pub(crate) fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    schema::init_schema(&conn).unwrap();
    conn
}

fn insert<T: Record>(conn: &Connection, row: T) -> T {
    resources::create(conn, &row).unwrap()
}

pub(crate) fn add_line(conn: &Connection, line: Line) -> Line {
    insert(conn, line)
}

pub(crate) fn add_user(conn: &Connection, callerid: &str) -> User {
    insert(
        conn,
        User {
            callerid: Some(callerid.to_string()),
            ..Default::default()
        },
    )
}

pub(crate) fn add_user_line(
    conn: &Connection,
    user_id: i64,
    line_id: i64,
    main_user: bool,
    main_line: bool,
) -> UserLine {
    let row = UserLine {
        user_id,
        line_id,
        main_user,
        main_line,
    };
    record::insert(conn, &row).unwrap();
    row
}

pub(crate) fn add_sip(conn: &Connection, sip: SipEndpoint) -> SipEndpoint {
    insert(conn, sip)
}

pub(crate) fn add_sccp(conn: &Connection, name: &str) -> SccpEndpoint {
    add_sccp_with_cid(conn, name, "", "")
}

pub(crate) fn add_sccp_with_cid(
    conn: &Connection,
    name: &str,
    cid_name: &str,
    cid_num: &str,
) -> SccpEndpoint {
    insert(
        conn,
        SccpEndpoint {
            name: name.to_string(),
            cid_name: cid_name.to_string(),
            cid_num: cid_num.to_string(),
            ..Default::default()
        },
    )
}

pub(crate) fn add_custom(conn: &Connection, custom: CustomEndpoint) -> CustomEndpoint {
    insert(conn, custom)
}

pub(crate) fn add_iax(conn: &Connection, iax: IaxEndpoint) -> IaxEndpoint {
    insert(conn, iax)
}

pub(crate) fn add_extension(conn: &Connection, exten: &str, context: &str) -> Extension {
    insert(conn, Extension::new(exten, context))
}

pub(crate) fn add_line_extension(conn: &Connection, line_id: i64, extension_id: i64) -> LineExtension {
    add_line_extension_with(conn, line_id, extension_id, true)
}

pub(crate) fn add_line_extension_with(
    conn: &Connection,
    line_id: i64,
    extension_id: i64,
    main_extension: bool,
) -> LineExtension {
    let row = LineExtension {
        line_id,
        extension_id,
        main_extension,
    };
    record::insert(conn, &row).unwrap();
    row
}

pub(crate) fn add_trunk(conn: &Connection, trunk: Trunk) -> Trunk {
    insert(conn, trunk)
}

pub(crate) fn add_register_sip(conn: &Connection, var_val: &str) -> RegisterSip {
    insert(
        conn,
        RegisterSip {
            var_val: var_val.to_string(),
            ..Default::default()
        },
    )
}

pub(crate) fn add_register_iax(conn: &Connection, var_val: &str) -> RegisterIax {
    insert(
        conn,
        RegisterIax {
            var_val: var_val.to_string(),
            ..Default::default()
        },
    )
}

/// Unsaved user member of a queue.
pub(crate) fn member(queue_name: &str, user_id: i64, interface: &str, channel: &str) -> QueueMember {
    QueueMember {
        queue_name: queue_name.to_string(),
        interface: interface.to_string(),
        usertype: MEMBER_USER.to_string(),
        userid: user_id,
        channel: channel.to_string(),
        category: CATEGORY_QUEUE.to_string(),
        ..Default::default()
    }
}

pub(crate) fn add_queue_member(
    conn: &Connection,
    queue_name: &str,
    user_id: i64,
    interface: &str,
    channel: &str,
) -> QueueMember {
    insert(conn, member(queue_name, user_id, interface, channel))
}
