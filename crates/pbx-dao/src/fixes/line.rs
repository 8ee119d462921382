use rusqlite::Connection;
use tracing::{debug, warn};

use crate::errors::DaoResult;
use crate::fixes::queue_member::{save_member, user_members};
use crate::models::{CallerId, Extension, Line, ResolvedEndpoint, Resolution, User};
use crate::resources::{line, user};
use crate::store::record;
use crate::store::session::with_savepoint;

/// Recomputes everything cached on and around one line.
pub struct LineFixes<'c> {
    conn: &'c Connection,
}

impl<'c> LineFixes<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn fix(&self, line_id: i64) -> DaoResult<()> {
        with_savepoint(self.conn, "line_fixes", |conn| fix_line(conn, line_id))
    }
}

fn fix_line(conn: &Connection, line_id: i64) -> DaoResult<()> {
    let mut line = line::get(conn, line_id)?;
    let before = line.clone();

    let resolution = line::resolve_endpoint(conn, &line)?;
    if resolution == Resolution::Dangling {
        warn!(
            line_id,
            protocol = ?line.protocol,
            protocolid = ?line.protocolid,
            "line points at a missing endpoint, clearing it"
        );
        line.set_endpoint(None);
    }
    let extension = line::main_extension(conn, line_id)?;

    if let Some(endpoint) = resolution.resolved() {
        fix_queue_members(conn, line_id, endpoint, extension.as_ref())?;
    }

    line.name = resolution.resolved().map(ResolvedEndpoint::line_name);
    match &extension {
        Some(ext) => {
            line.number = Some(ext.exten.clone());
            line.context = Some(ext.context.clone());
        }
        None => line.number = None,
    }
    if line != before {
        debug!(line_id, name = ?line.name, number = ?line.number, context = ?line.context, "line rewritten");
        record::update(conn, &line)?;
    }

    if let Resolution::Resolved(endpoint) = resolution {
        let caller_id = main_user_caller_id(conn, line_id, extension.as_ref())?;
        fix_endpoint(conn, &line, endpoint, caller_id)?;
    }
    Ok(())
}

/// Queue members of every user whose main line is this line.
fn fix_queue_members(
    conn: &Connection,
    line_id: i64,
    endpoint: &ResolvedEndpoint,
    extension: Option<&Extension>,
) -> DaoResult<()> {
    let mut stmt = conn.prepare(
        "SELECT user_id FROM user_line WHERE line_id = ?1 AND main_line = 1 ORDER BY user_id;",
    )?;
    let user_ids = stmt
        .query_map([line_id], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for user_id in user_ids {
        for mut member in user_members(conn, user_id)? {
            save_member(conn, &mut member, endpoint, extension)?;
        }
    }
    Ok(())
}

/// Caller id the endpoint should carry, `None` when the line has no single
/// main user.
fn main_user_caller_id(
    conn: &Connection,
    line_id: i64,
    extension: Option<&Extension>,
) -> DaoResult<Option<CallerId>> {
    let mut stmt = conn.prepare(
        "SELECT user_id FROM user_line WHERE line_id = ?1 AND main_user = 1 ORDER BY user_id;",
    )?;
    let main_users = stmt
        .query_map([line_id], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    let user_id = match main_users.as_slice() {
        [] => return Ok(None),
        [user_id] => *user_id,
        many => {
            warn!(line_id, main_users = ?many, "line has several main users, caller id left as is");
            return Ok(None);
        }
    };
    let user: User = user::get(conn, user_id)?;
    let user_caller_id = user::caller_id(&user);
    Ok(Some(CallerId {
        name: user_caller_id.name,
        number: extension.map(|ext| ext.exten.clone()).or(user_caller_id.number),
    }))
}

fn fix_endpoint(
    conn: &Connection,
    line: &Line,
    endpoint: ResolvedEndpoint,
    caller_id: Option<CallerId>,
) -> DaoResult<()> {
    match endpoint {
        ResolvedEndpoint::Sip(mut sip) => {
            let before = sip.clone();
            sip.context = line.context.clone();
            if let Some(cid) = caller_id {
                sip.callerid = Some(cid.format());
            }
            if sip != before {
                debug!(line_id = line.id, sip_id = sip.id, callerid = ?sip.callerid, "sip endpoint rewritten");
                record::update(conn, &sip)?;
            }
        }
        ResolvedEndpoint::Sccp(mut sccp) => {
            let before = sccp.clone();
            if let Some(cid) = caller_id {
                sccp.cid_name = cid.name;
                sccp.cid_num = cid.number.unwrap_or_default();
            }
            if sccp != before {
                debug!(line_id = line.id, sccp_id = sccp.id, "sccp endpoint rewritten");
                record::update(conn, &sccp)?;
            }
        }
        ResolvedEndpoint::Custom(mut custom) => {
            let before = custom.clone();
            custom.context = line.context.clone();
            if custom != before {
                debug!(line_id = line.id, custom_id = custom.id, "custom endpoint rewritten");
                record::update(conn, &custom)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomEndpoint, EndpointRef, SipEndpoint};
    use crate::resources::{endpoint_custom, endpoint_sccp, endpoint_sip, extension, queue};
    use crate::testing;

    fn sip_line(conn: &Connection, sip: &SipEndpoint, context: &str) -> Line {
        let mut line = Line::new(context);
        line.set_endpoint(Some(EndpointRef::Sip(sip.id)));
        testing::add_line(conn, line)
    }

    fn sccp_line(conn: &Connection, sccp_id: i64) -> Line {
        let mut line = Line::new("default");
        line.set_endpoint(Some(EndpointRef::Sccp(sccp_id)));
        testing::add_line(conn, line)
    }

    fn sip_with_callerid(conn: &Connection, name: &str) -> SipEndpoint {
        testing::add_sip(
            conn,
            SipEndpoint {
                callerid: Some("\"Rôger Rabbit\" <2000>".into()),
                ..SipEndpoint::new(name)
            },
        )
    }

    fn fix(conn: &Connection, line_id: i64) {
        LineFixes::new(conn).fix(line_id).unwrap();
    }

    // -- context ------------------------------------------------------------

    #[test]
    fn test_extension_context_change_updates_line_and_sip() {
        let conn = testing::setup_db();
        let sip = testing::add_sip(&conn, SipEndpoint::new("abc"));
        let line = sip_line(&conn, &sip, "default");
        let mut ext = testing::add_extension(&conn, "1000", "default");
        testing::add_line_extension(&conn, line.id, ext.id);

        ext.context = "other_default".into();
        record::update(&conn, &ext).unwrap();
        fix(&conn, line.id);

        assert_eq!(
            endpoint_sip::get(&conn, sip.id).unwrap().context.as_deref(),
            Some("other_default")
        );
        assert_eq!(
            line::get(&conn, line.id).unwrap().context.as_deref(),
            Some("other_default")
        );
        assert_eq!(extension::get(&conn, ext.id).unwrap().context, "other_default");
    }

    #[test]
    fn test_line_context_copied_to_sip() {
        let conn = testing::setup_db();
        let user = testing::add_user(&conn, "\"Jôhn Smith\" <1000>");
        let sip = sip_with_callerid(&conn, "abc");
        let line = sip_line(&conn, &sip, "mycontext");
        testing::add_user_line(&conn, user.id, line.id, true, true);

        fix(&conn, line.id);

        assert_eq!(
            endpoint_sip::get(&conn, sip.id).unwrap().context.as_deref(),
            Some("mycontext")
        );
    }

    #[test]
    fn test_custom_endpoint_gets_context_and_line_gets_interface() {
        let conn = testing::setup_db();
        let custom = testing::add_custom(&conn, CustomEndpoint::new("custom/abcdef"));
        let mut line = Line::new("default");
        line.set_endpoint(Some(EndpointRef::Custom(custom.id)));
        let line = testing::add_line(&conn, line);

        fix(&conn, line.id);

        let custom = endpoint_custom::get(&conn, custom.id).unwrap();
        assert_eq!(custom.context.as_deref(), Some("default"));
        assert_eq!(
            line::get(&conn, line.id).unwrap().name.as_deref(),
            Some("custom/abcdef")
        );
    }

    // -- SIP caller id --------------------------------------------------------

    #[test]
    fn test_user_caller_name_only_replaces_sip_caller_id() {
        let conn = testing::setup_db();
        let user = testing::add_user(&conn, "\"Jôhn Smith\"");
        let sip = sip_with_callerid(&conn, "abc");
        let line = sip_line(&conn, &sip, "default");
        testing::add_user_line(&conn, user.id, line.id, true, true);

        fix(&conn, line.id);

        assert_eq!(
            endpoint_sip::get(&conn, sip.id).unwrap().callerid.as_deref(),
            Some("\"Jôhn Smith\"")
        );
    }

    #[test]
    fn test_user_caller_name_and_number_replace_sip_caller_id() {
        let conn = testing::setup_db();
        let user = testing::add_user(&conn, "\"Jôhn Smith\" <1000>");
        let sip = sip_with_callerid(&conn, "abc");
        let line = sip_line(&conn, &sip, "default");
        testing::add_user_line(&conn, user.id, line.id, true, true);

        fix(&conn, line.id);

        assert_eq!(
            endpoint_sip::get(&conn, sip.id).unwrap().callerid.as_deref(),
            Some("\"Jôhn Smith\" <1000>")
        );
    }

    #[test]
    fn test_embedded_quotes_dropped_from_sip_caller_id() {
        let conn = testing::setup_db();
        let user = testing::add_user(&conn, "Jo \"Bo\" Smith");
        let sip = sip_with_callerid(&conn, "abc");
        let line = sip_line(&conn, &sip, "default");
        testing::add_user_line(&conn, user.id, line.id, true, true);

        fix(&conn, line.id);

        assert_eq!(
            endpoint_sip::get(&conn, sip.id).unwrap().callerid.as_deref(),
            Some("\"Jo Bo Smith\"")
        );
    }

    #[test]
    fn test_extension_number_used_for_sip_caller_id() {
        let conn = testing::setup_db();
        let user = testing::add_user(&conn, "\"Jôhn Smith\"");
        let sip = sip_with_callerid(&conn, "abc");
        let line = sip_line(&conn, &sip, "default");
        let ext = testing::add_extension(&conn, "3000", "default");
        testing::add_user_line(&conn, user.id, line.id, true, true);
        testing::add_line_extension(&conn, line.id, ext.id);

        fix(&conn, line.id);

        assert_eq!(
            endpoint_sip::get(&conn, sip.id).unwrap().callerid.as_deref(),
            Some("\"Jôhn Smith\" <3000>")
        );
    }

    #[test]
    fn test_extension_number_wins_over_user_number_for_sip() {
        let conn = testing::setup_db();
        let user = testing::add_user(&conn, "\"Jôhn Smith\" <1000>");
        let sip = sip_with_callerid(&conn, "abc");
        let line = sip_line(&conn, &sip, "default");
        let ext = testing::add_extension(&conn, "3000", "default");
        testing::add_user_line(&conn, user.id, line.id, true, true);
        testing::add_line_extension(&conn, line.id, ext.id);

        fix(&conn, line.id);

        assert_eq!(
            endpoint_sip::get(&conn, sip.id).unwrap().callerid.as_deref(),
            Some("\"Jôhn Smith\" <3000>")
        );
    }

    #[test]
    fn test_line_without_main_user_keeps_sip_caller_id() {
        let conn = testing::setup_db();
        let sip = sip_with_callerid(&conn, "abc");
        let line = sip_line(&conn, &sip, "default");

        fix(&conn, line.id);

        assert_eq!(
            endpoint_sip::get(&conn, sip.id).unwrap().callerid.as_deref(),
            Some("\"Rôger Rabbit\" <2000>")
        );
    }

    #[test]
    fn test_two_main_users_skip_caller_id() {
        let conn = testing::setup_db();
        let first = testing::add_user(&conn, "\"Jôhn Smith\" <1000>");
        let second = testing::add_user(&conn, "\"Géorge Green\" <1001>");
        let sip = sip_with_callerid(&conn, "abc");
        let line = sip_line(&conn, &sip, "default");
        testing::add_user_line(&conn, first.id, line.id, true, true);
        testing::add_user_line(&conn, second.id, line.id, true, true);

        fix(&conn, line.id);

        let sip = endpoint_sip::get(&conn, sip.id).unwrap();
        assert_eq!(sip.callerid.as_deref(), Some("\"Rôger Rabbit\" <2000>"));
        assert_eq!(line::get(&conn, line.id).unwrap().name.as_deref(), Some("abc"));
    }

    // -- SCCP caller id -------------------------------------------------------

    #[test]
    fn test_user_caller_name_only_sets_sccp_with_empty_number() {
        let conn = testing::setup_db();
        let user = testing::add_user(&conn, "\"Jôhn Smith\"");
        let sccp = testing::add_sccp_with_cid(&conn, "abc", "Rôger Rabbit", "2000");
        let line = sccp_line(&conn, sccp.id);
        testing::add_user_line(&conn, user.id, line.id, true, true);

        fix(&conn, line.id);

        let sccp = endpoint_sccp::get(&conn, sccp.id).unwrap();
        assert_eq!(sccp.cid_name, "Jôhn Smith");
        assert_eq!(sccp.cid_num, "");
    }

    #[test]
    fn test_user_caller_name_and_number_set_sccp() {
        let conn = testing::setup_db();
        let user = testing::add_user(&conn, "\"Jôhn Smith\" <1000>");
        let sccp = testing::add_sccp_with_cid(&conn, "abc", "Rôger Rabbit", "2000");
        let line = sccp_line(&conn, sccp.id);
        testing::add_user_line(&conn, user.id, line.id, true, true);

        fix(&conn, line.id);

        let sccp = endpoint_sccp::get(&conn, sccp.id).unwrap();
        assert_eq!(sccp.cid_name, "Jôhn Smith");
        assert_eq!(sccp.cid_num, "1000");
    }

    #[test]
    fn test_extension_number_used_for_sccp() {
        let conn = testing::setup_db();
        let user = testing::add_user(&conn, "\"Jôhn Smith\" <1000>");
        let sccp = testing::add_sccp_with_cid(&conn, "abc", "Rôger Rabbit", "2000");
        let line = sccp_line(&conn, sccp.id);
        let ext = testing::add_extension(&conn, "3000", "default");
        testing::add_user_line(&conn, user.id, line.id, true, true);
        testing::add_line_extension(&conn, line.id, ext.id);

        fix(&conn, line.id);

        let sccp = endpoint_sccp::get(&conn, sccp.id).unwrap();
        assert_eq!(sccp.cid_name, "Jôhn Smith");
        assert_eq!(sccp.cid_num, "3000");
    }

    #[test]
    fn test_only_main_user_drives_sccp_caller_id() {
        let conn = testing::setup_db();
        let main_user = testing::add_user(&conn, "\"Jôhn Smith\" <1000>");
        let other_user = testing::add_user(&conn, "\"Géorge Green\" <1001>");
        let sccp = testing::add_sccp_with_cid(&conn, "abc", "Rôger Rabbit", "2000");
        let line = sccp_line(&conn, sccp.id);
        testing::add_user_line(&conn, main_user.id, line.id, true, true);
        testing::add_user_line(&conn, other_user.id, line.id, false, true);

        fix(&conn, line.id);

        let sccp = endpoint_sccp::get(&conn, sccp.id).unwrap();
        assert_eq!(sccp.cid_name, "Jôhn Smith");
        assert_eq!(sccp.cid_num, "1000");
    }

    // -- number / name / protocol -------------------------------------------

    #[test]
    fn test_extension_sets_line_number_and_context() {
        let conn = testing::setup_db();
        let line = testing::add_line(
            &conn,
            Line {
                number: Some("2000".into()),
                ..Line::new("mycontext")
            },
        );
        let ext = testing::add_extension(&conn, "1000", "default");
        testing::add_line_extension(&conn, line.id, ext.id);

        fix(&conn, line.id);

        let line = line::get(&conn, line.id).unwrap();
        assert_eq!(line.number.as_deref(), Some("1000"));
        assert_eq!(line.context.as_deref(), Some("default"));
    }

    #[test]
    fn test_no_extension_clears_number_keeps_context() {
        let conn = testing::setup_db();
        let line = testing::add_line(
            &conn,
            Line {
                number: Some("2000".into()),
                ..Line::new("mycontext")
            },
        );

        fix(&conn, line.id);

        let line = line::get(&conn, line.id).unwrap();
        assert_eq!(line.number, None);
        assert_eq!(line.context.as_deref(), Some("mycontext"));
    }

    #[test]
    fn test_sip_name_copied_to_line() {
        let conn = testing::setup_db();
        let sip = sip_with_callerid(&conn, "sipname");
        let mut line = Line {
            name: Some("linename".into()),
            ..Line::new("default")
        };
        line.set_endpoint(Some(EndpointRef::Sip(sip.id)));
        let line = testing::add_line(&conn, line);

        fix(&conn, line.id);

        assert_eq!(line::get(&conn, line.id).unwrap().name.as_deref(), Some("sipname"));
    }

    #[test]
    fn test_sccp_name_copied_to_line() {
        let conn = testing::setup_db();
        let sccp = testing::add_sccp(&conn, "1234");
        let line = sccp_line(&conn, sccp.id);

        fix(&conn, line.id);

        assert_eq!(line::get(&conn, line.id).unwrap().name.as_deref(), Some("1234"));
    }

    #[test]
    fn test_no_endpoint_clears_name() {
        let conn = testing::setup_db();
        let line = testing::add_line(
            &conn,
            Line {
                name: Some("linename".into()),
                ..Line::new("default")
            },
        );

        fix(&conn, line.id);

        assert_eq!(line::get(&conn, line.id).unwrap().name, None);
    }

    #[test]
    fn test_dangling_sip_reference_is_cleared() {
        let conn = testing::setup_db();
        let mut line = Line::new("default");
        line.set_endpoint(Some(EndpointRef::Sip(1234)));
        let line = testing::add_line(&conn, line);

        fix(&conn, line.id);

        let line = line::get(&conn, line.id).unwrap();
        assert_eq!(line.protocol, None);
        assert_eq!(line.protocolid, None);
    }

    #[test]
    fn test_dangling_custom_reference_is_cleared() {
        let conn = testing::setup_db();
        let mut line = Line::new("default");
        line.set_endpoint(Some(EndpointRef::Custom(1234)));
        let line = testing::add_line(&conn, line);

        fix(&conn, line.id);

        let line = line::get(&conn, line.id).unwrap();
        assert_eq!(line.protocol, None);
        assert_eq!(line.protocolid, None);
    }

    #[test]
    fn test_unknown_protocol_is_cleared() {
        let conn = testing::setup_db();
        let line = testing::add_line(
            &conn,
            Line {
                protocol: Some("h323".into()),
                protocolid: Some(1),
                ..Line::new("default")
            },
        );

        fix(&conn, line.id);

        assert_eq!(line::get(&conn, line.id).unwrap().protocol, None);
    }

    // -- queue members -------------------------------------------------------

    #[test]
    fn test_sip_name_rewrites_queue_member_interface() {
        let conn = testing::setup_db();
        let sip = testing::add_sip(&conn, SipEndpoint::new("abcdef"));
        let line = sip_line(&conn, &sip, "default");
        let user = testing::add_user(&conn, "\"Alice\"");
        testing::add_user_line(&conn, user.id, line.id, true, true);
        let member = testing::add_queue_member(&conn, "q1", user.id, "SIP/default", "SIP");

        fix(&conn, line.id);

        let member = queue::find_member(&conn, member.id).unwrap().unwrap();
        assert_eq!(member.interface, "SIP/abcdef");
        assert_eq!(member.channel, "SIP");
    }

    #[test]
    fn test_sccp_name_rewrites_queue_member_interface() {
        let conn = testing::setup_db();
        let sccp = testing::add_sccp(&conn, "abcdef");
        let line = sccp_line(&conn, sccp.id);
        let user = testing::add_user(&conn, "\"Alice\"");
        testing::add_user_line(&conn, user.id, line.id, true, true);
        let member = testing::add_queue_member(&conn, "q1", user.id, "SCCP/default", "SCCP");

        fix(&conn, line.id);

        let member = queue::find_member(&conn, member.id).unwrap().unwrap();
        assert_eq!(member.interface, "SCCP/abcdef");
    }

    #[test]
    fn test_custom_interface_rewrites_queue_member() {
        let conn = testing::setup_db();
        let custom = testing::add_custom(&conn, CustomEndpoint::new("custom/abcdef"));
        let mut line = Line::new("default");
        line.set_endpoint(Some(EndpointRef::Custom(custom.id)));
        let line = testing::add_line(&conn, line);
        let user = testing::add_user(&conn, "\"Alice\"");
        testing::add_user_line(&conn, user.id, line.id, true, true);
        let member = testing::add_queue_member(&conn, "q1", user.id, "custom/invalid", "SIP");

        fix(&conn, line.id);

        let member = queue::find_member(&conn, member.id).unwrap().unwrap();
        assert_eq!(member.interface, "custom/abcdef");
        assert_eq!(member.channel, "**Unknown**");
    }

    #[test]
    fn test_secondary_line_leaves_queue_member_alone() {
        let conn = testing::setup_db();
        let sip1 = testing::add_sip(&conn, SipEndpoint::new("default"));
        let line1 = sip_line(&conn, &sip1, "default");
        let sip2 = testing::add_sip(&conn, SipEndpoint::new("abcdef"));
        let line2 = sip_line(&conn, &sip2, "default");
        let user = testing::add_user(&conn, "\"Alice\"");
        testing::add_user_line(&conn, user.id, line1.id, true, true);
        testing::add_user_line(&conn, user.id, line2.id, true, false);
        let member = testing::add_queue_member(&conn, "q1", user.id, "SIP/default", "SIP");

        fix(&conn, line2.id);

        let member = queue::find_member(&conn, member.id).unwrap().unwrap();
        assert_eq!(member.interface, "SIP/default");
    }

    #[test]
    fn test_local_member_without_extension_is_untouched() {
        let conn = testing::setup_db();
        let sip = testing::add_sip(&conn, SipEndpoint::new("abcdef"));
        let line = sip_line(&conn, &sip, "default");
        let user = testing::add_user(&conn, "\"Alice\"");
        testing::add_user_line(&conn, user.id, line.id, true, true);
        let member = testing::add_queue_member(&conn, "q1", user.id, "SIP/default", "Local");

        fix(&conn, line.id);

        let member = queue::find_member(&conn, member.id).unwrap().unwrap();
        assert_eq!(member.interface, "SIP/default");
        assert_eq!(member.channel, "Local");
    }

    #[test]
    fn test_local_member_with_extension_gets_local_interface() {
        let conn = testing::setup_db();
        let sip = testing::add_sip(&conn, SipEndpoint::new("abcdef"));
        let line = sip_line(&conn, &sip, "default");
        let user = testing::add_user(&conn, "\"Alice\"");
        let ext = testing::add_extension(&conn, "12345", "wonderland");
        testing::add_user_line(&conn, user.id, line.id, true, true);
        testing::add_line_extension(&conn, line.id, ext.id);
        let member = testing::add_queue_member(&conn, "q1", user.id, "SIP/default", "Local");

        fix(&conn, line.id);

        let member = queue::find_member(&conn, member.id).unwrap().unwrap();
        assert_eq!(member.interface, "Local/12345@wonderland");
    }

    // -- fix contract ----------------------------------------------------------

    #[test]
    fn test_fix_is_idempotent() {
        let conn = testing::setup_db();
        let user = testing::add_user(&conn, "\"Jôhn Smith\" <1000>");
        let sip = sip_with_callerid(&conn, "abcdef");
        let line = sip_line(&conn, &sip, "default");
        let ext = testing::add_extension(&conn, "3000", "office");
        testing::add_user_line(&conn, user.id, line.id, true, true);
        testing::add_line_extension(&conn, line.id, ext.id);
        let member = testing::add_queue_member(&conn, "q1", user.id, "SIP/default", "SIP");

        fix(&conn, line.id);
        let snapshot = (
            line::get(&conn, line.id).unwrap(),
            endpoint_sip::get(&conn, sip.id).unwrap(),
            queue::find_member(&conn, member.id).unwrap(),
        );
        fix(&conn, line.id);

        assert_eq!(
            snapshot,
            (
                line::get(&conn, line.id).unwrap(),
                endpoint_sip::get(&conn, sip.id).unwrap(),
                queue::find_member(&conn, member.id).unwrap(),
            )
        );
    }

    #[test]
    fn test_failed_fix_leaves_no_partial_writes() {
        let conn = testing::setup_db();
        let sip = testing::add_sip(&conn, SipEndpoint::new("abcdef"));
        let line = sip_line(&conn, &sip, "default");
        let user = testing::add_user(&conn, "\"Alice\"");
        testing::add_user_line(&conn, user.id, line.id, true, true);
        let member = testing::add_queue_member(&conn, "q1", user.id, "SIP/default", "SIP");
        // Line row is written after the queue member; make that write fail.
        conn.execute_batch(
            "CREATE TRIGGER reject_line_update BEFORE UPDATE ON linefeatures
             BEGIN SELECT RAISE(ABORT, 'line is read only'); END;",
        )
        .unwrap();

        let result = LineFixes::new(&conn).fix(line.id);

        assert!(result.is_err());
        let member_after = queue::find_member(&conn, member.id).unwrap().unwrap();
        assert_eq!(member_after.interface, "SIP/default");
    }

    #[test]
    fn test_fix_missing_line_is_not_found() {
        let conn = testing::setup_db();
        assert!(LineFixes::new(&conn).fix(99).unwrap_err().is_not_found());
    }
}
