use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::fixes::{LineFixes, QueueMemberFixes};
use crate::resources::user;
use crate::store::session::with_savepoint;

/// Fixes every line of a user, then the user's queue members.
pub struct UserFixes<'c> {
    conn: &'c Connection,
}

impl<'c> UserFixes<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn fix(&self, user_id: i64) -> DaoResult<()> {
        with_savepoint(self.conn, "user_fixes", |conn| {
            user::get(conn, user_id)?;
            for line_id in user::line_ids(conn, user_id)? {
                LineFixes::new(conn).fix(line_id)?;
            }
            QueueMemberFixes::new(conn).fix_user(user_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointRef, Line, SccpEndpoint};
    use crate::resources::{endpoint_sccp, queue};
    use crate::store::record;
    use crate::testing;

    #[test]
    fn test_caller_id_change_reaches_every_line() {
        let conn = testing::setup_db();
        let mut user = testing::add_user(&conn, "\"Jôhn Smith\" <1000>");
        let sccp1: SccpEndpoint = testing::add_sccp(&conn, "one");
        let sccp2: SccpEndpoint = testing::add_sccp(&conn, "two");
        for sccp in [&sccp1, &sccp2] {
            let mut line = Line::new("default");
            line.set_endpoint(Some(EndpointRef::Sccp(sccp.id)));
            let line = testing::add_line(&conn, line);
            testing::add_user_line(&conn, user.id, line.id, true, sccp.id == sccp1.id);
        }

        user.callerid = Some("\"Jane Doe\" <1001>".into());
        record::update(&conn, &user).unwrap();
        UserFixes::new(&conn).fix(user.id).unwrap();

        for sccp in [sccp1, sccp2] {
            let fixed = endpoint_sccp::get(&conn, sccp.id).unwrap();
            assert_eq!(fixed.cid_name, "Jane Doe");
            assert_eq!(fixed.cid_num, "1001");
        }
    }

    #[test]
    fn test_queue_members_follow_main_line() {
        let conn = testing::setup_db();
        let user = testing::add_user(&conn, "\"Alice\"");
        let sccp = testing::add_sccp(&conn, "abcdef");
        let mut line = Line::new("default");
        line.set_endpoint(Some(EndpointRef::Sccp(sccp.id)));
        let line = testing::add_line(&conn, line);
        testing::add_user_line(&conn, user.id, line.id, true, true);
        let member = testing::add_queue_member(&conn, "q1", user.id, "SIP/old", "SIP");

        UserFixes::new(&conn).fix(user.id).unwrap();

        let member = queue::find_member(&conn, member.id).unwrap().unwrap();
        assert_eq!(member.interface, "SCCP/abcdef");
        assert_eq!(member.channel, "SCCP");
    }

    #[test]
    fn test_missing_user_is_not_found() {
        let conn = testing::setup_db();
        assert!(UserFixes::new(&conn).fix(7).unwrap_err().is_not_found());
    }
}
