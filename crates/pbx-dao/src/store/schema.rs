//! SQLite schema DDL.
//!
//! The tables mirror the PBX configuration schema: features tables for users,
//! lines, trunks and queues, endpoint tables per protocol, and the association
//! tables linking them. The `protocol`/`protocolid` pairs and `registerid`
//! are not foreign keys; `crate::fixes` clears them when they dangle.

use rusqlite::Connection;
use tracing::info;

use crate::errors::DaoResult;
use crate::store::session::with_savepoint;

/// Core DDL statements: 19 CREATE TABLE + 8 CREATE INDEX.
///
/// Executed with `CREATE … IF NOT EXISTS` so they are safe to replay on an
/// already-initialised database.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // ── tables (19) ─────────────────────────────────────────────────────
    "CREATE TABLE IF NOT EXISTS extensions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        commented INTEGER NOT NULL DEFAULT 0,
        context TEXT NOT NULL DEFAULT '',
        exten TEXT NOT NULL DEFAULT '',
        type TEXT NOT NULL DEFAULT 'user',
        typeval TEXT NOT NULL DEFAULT '0',
        UNIQUE(exten, context)
    );",
    "CREATE TABLE IF NOT EXISTS linefeatures (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        protocol TEXT,
        protocolid INTEGER,
        name TEXT,
        number TEXT,
        context TEXT,
        provisioningid INTEGER NOT NULL DEFAULT 0,
        position INTEGER NOT NULL DEFAULT 1,
        description TEXT,
        commented INTEGER NOT NULL DEFAULT 0
    );",
    "CREATE TABLE IF NOT EXISTS line_extension (
        line_id INTEGER NOT NULL REFERENCES linefeatures(id) ON DELETE CASCADE,
        extension_id INTEGER NOT NULL REFERENCES extensions(id) ON DELETE CASCADE,
        main_extension INTEGER NOT NULL DEFAULT 1,
        PRIMARY KEY(line_id, extension_id)
    );",
    "CREATE TABLE IF NOT EXISTS userfeatures (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        firstname TEXT NOT NULL DEFAULT '',
        lastname TEXT NOT NULL DEFAULT '',
        callerid TEXT,
        outcallerid TEXT,
        email TEXT,
        description TEXT,
        commented INTEGER NOT NULL DEFAULT 0
    );",
    "CREATE TABLE IF NOT EXISTS user_line (
        user_id INTEGER NOT NULL REFERENCES userfeatures(id) ON DELETE CASCADE,
        line_id INTEGER NOT NULL REFERENCES linefeatures(id) ON DELETE CASCADE,
        main_user INTEGER NOT NULL,
        main_line INTEGER NOT NULL,
        PRIMARY KEY(user_id, line_id)
    );",
    "CREATE TABLE IF NOT EXISTS usersip (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        context TEXT,
        callerid TEXT,
        secret TEXT NOT NULL DEFAULT '',
        type TEXT NOT NULL DEFAULT 'friend',
        host TEXT NOT NULL DEFAULT 'dynamic',
        category TEXT NOT NULL DEFAULT 'user',
        commented INTEGER NOT NULL DEFAULT 0
    );",
    "CREATE TABLE IF NOT EXISTS sccpline (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        cid_name TEXT NOT NULL DEFAULT '',
        cid_num TEXT NOT NULL DEFAULT '',
        commented INTEGER NOT NULL DEFAULT 0
    );",
    "CREATE TABLE IF NOT EXISTS usercustom (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        context TEXT,
        interface TEXT NOT NULL DEFAULT '',
        category TEXT NOT NULL DEFAULT 'user',
        commented INTEGER NOT NULL DEFAULT 0
    );",
    "CREATE TABLE IF NOT EXISTS useriax (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        context TEXT,
        type TEXT NOT NULL DEFAULT 'friend',
        host TEXT NOT NULL DEFAULT 'dynamic',
        category TEXT NOT NULL DEFAULT 'trunk',
        commented INTEGER NOT NULL DEFAULT 0
    );",
    "CREATE TABLE IF NOT EXISTS trunkfeatures (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        protocol TEXT,
        protocolid INTEGER,
        registerid INTEGER NOT NULL DEFAULT 0,
        registercommented INTEGER NOT NULL DEFAULT 0,
        description TEXT,
        context TEXT
    );",
    "CREATE TABLE IF NOT EXISTS register_sip (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        var_val TEXT NOT NULL,
        commented INTEGER NOT NULL DEFAULT 0
    );",
    "CREATE TABLE IF NOT EXISTS register_iax (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        var_val TEXT NOT NULL,
        commented INTEGER NOT NULL DEFAULT 0
    );",
    "CREATE TABLE IF NOT EXISTS agentfeatures (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        number TEXT NOT NULL UNIQUE,
        firstname TEXT NOT NULL DEFAULT '',
        lastname TEXT NOT NULL DEFAULT '',
        description TEXT
    );",
    "CREATE TABLE IF NOT EXISTS queuefeatures (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        displayname TEXT NOT NULL,
        number TEXT,
        context TEXT,
        timeout INTEGER,
        commented INTEGER NOT NULL DEFAULT 0
    );",
    "CREATE TABLE IF NOT EXISTS queuemember (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        queue_name TEXT NOT NULL,
        interface TEXT NOT NULL,
        penalty INTEGER NOT NULL DEFAULT 0,
        commented INTEGER NOT NULL DEFAULT 0,
        usertype TEXT NOT NULL CHECK (usertype IN ('agent', 'user')),
        userid INTEGER NOT NULL,
        channel TEXT NOT NULL,
        category TEXT NOT NULL CHECK (category IN ('queue', 'group')),
        position INTEGER NOT NULL DEFAULT 0,
        UNIQUE(queue_name, interface),
        UNIQUE(queue_name, channel, usertype, userid, category)
    );",
    "CREATE TABLE IF NOT EXISTS schedule (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        timezone TEXT,
        fallback_action TEXT NOT NULL DEFAULT 'none',
        fallback_actionid TEXT,
        fallback_actionargs TEXT,
        description TEXT,
        commented INTEGER NOT NULL DEFAULT 0
    );",
    "CREATE TABLE IF NOT EXISTS moh (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        label TEXT,
        mode TEXT NOT NULL DEFAULT 'files',
        application TEXT,
        sort TEXT
    );",
    "CREATE TABLE IF NOT EXISTS paging (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        number TEXT,
        name TEXT,
        announce_sound TEXT,
        commented INTEGER NOT NULL DEFAULT 0
    );",
    "CREATE TABLE IF NOT EXISTS accessfeatures (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        host TEXT NOT NULL DEFAULT '',
        feature TEXT NOT NULL DEFAULT 'phonebook',
        commented INTEGER NOT NULL DEFAULT 0
    );",
    // ── indexes (8) ─────────────────────────────────────────────────────
    "CREATE INDEX IF NOT EXISTS idx_linefeatures_protocol ON linefeatures(protocol, protocolid);",
    "CREATE INDEX IF NOT EXISTS idx_user_line_user_id ON user_line(user_id);",
    "CREATE INDEX IF NOT EXISTS idx_user_line_line_id ON user_line(line_id);",
    "CREATE INDEX IF NOT EXISTS idx_line_extension_line_id ON line_extension(line_id);",
    "CREATE INDEX IF NOT EXISTS idx_trunkfeatures_registerid ON trunkfeatures(registerid);",
    "CREATE INDEX IF NOT EXISTS idx_queuemember_usertype ON queuemember(usertype);",
    "CREATE INDEX IF NOT EXISTS idx_queuemember_channel ON queuemember(channel);",
    "CREATE INDEX IF NOT EXISTS idx_queuemember_user ON queuemember(usertype, userid);",
];

/// Create every table and index. Replaying on an initialised database is a
/// no-op; a failing statement leaves nothing behind.
pub fn init_schema(conn: &Connection) -> DaoResult<()> {
    with_savepoint(conn, "init_schema", |conn| {
        for stmt in SCHEMA_STATEMENTS {
            conn.execute_batch(stmt)?;
        }
        Ok(())
    })?;
    info!(statements = SCHEMA_STATEMENTS.len(), "schema initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name;",
            )
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_init_creates_every_table() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables = table_names(&conn);
        assert_eq!(tables.len(), 19);
        for table in ["linefeatures", "user_line", "usersip", "trunkfeatures", "queuemember"] {
            assert!(tables.iter().any(|t| t == table), "missing {table}");
        }
    }

    #[test]
    fn test_init_is_replayable() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute("INSERT INTO linefeatures(context) VALUES ('default');", [])
            .unwrap();

        init_schema(&conn).unwrap();

        let lines: i64 = conn
            .query_row("SELECT COUNT(*) FROM linefeatures;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(lines, 1);
    }
}
