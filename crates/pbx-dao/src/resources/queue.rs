//! Queues (`queuefeatures`) and their members (`queuemember`).
//!
//! Members are keyed by queue name, not id. User members cache the interface
//! of the user's main line and are kept current by [`QueueMemberFixes`];
//! agent members always dial `Agent/{number}`.

use std::sync::LazyLock;

use rusqlite::{params, Connection};
use tracing::info;

use crate::errors::DaoResult;
use crate::fixes::QueueMemberFixes;
use crate::models::{
    Agent, Queue, QueueMember, CATEGORY_QUEUE, CHANNEL_AGENT, MEMBER_AGENT, MEMBER_USER,
};
use crate::query::criteria::{self, criteria, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::resources::{agent, user};
use crate::store::record;
use crate::store::session::with_savepoint;

static QUEUE_SEARCH: LazyLock<SearchSystem<Queue>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<Queue>()
            .columns(&["id", "name", "displayname", "number", "context"])
            .searchable(&["name", "displayname", "number"])
            .default_sort("name"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<Queue>> {
    QUEUE_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<Queue>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<Queue> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<Queue>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Queue> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<Queue>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, queue: &Queue) -> DaoResult<Queue> {
    super::create(conn, queue)
}

/// Renaming a queue carries its members along.
pub fn edit(conn: &Connection, queue: &Queue) -> DaoResult<()> {
    with_savepoint(conn, "queue_edit", |conn| {
        let old = get(conn, queue.id)?;
        record::update(conn, queue)?;
        if old.name != queue.name {
            conn.execute(
                "UPDATE queuemember SET queue_name = ?1 WHERE queue_name = ?2 AND category = ?3;",
                params![queue.name, old.name, CATEGORY_QUEUE],
            )?;
        }
        Ok(())
    })
}

pub fn delete(conn: &Connection, queue: &Queue) -> DaoResult<()> {
    with_savepoint(conn, "queue_delete", |conn| {
        conn.execute(
            "DELETE FROM queuemember WHERE queue_name = ?1 AND category = ?2;",
            params![queue.name, CATEGORY_QUEUE],
        )?;
        record::delete(conn, queue)?;
        info!(queue_id = queue.id, name = %queue.name, "queue deleted");
        Ok(())
    })
}

pub fn find_member(conn: &Connection, id: i64) -> DaoResult<Option<QueueMember>> {
    super::find(conn, id)
}

/// Members of the queue in dial position order.
pub fn members(conn: &Connection, queue: &Queue) -> DaoResult<Vec<QueueMember>> {
    let mut members: Vec<QueueMember> = criteria::find_all_by(
        conn,
        &criteria([
            ("queue_name", queue.name.clone()),
            ("category", CATEGORY_QUEUE.to_string()),
        ]),
    )?;
    members.sort_by_key(|m| (m.position, m.id));
    Ok(members)
}

/// Add a user member. `member.userid` names the user; `penalty`, `position`
/// and a `Local` channel are kept, the interface is derived from the user's
/// main line.
pub fn associate_member_user(
    conn: &Connection,
    queue: &Queue,
    member: &QueueMember,
) -> DaoResult<QueueMember> {
    with_savepoint(conn, "queue_member_user_associate", |conn| {
        user::get(conn, member.userid)?;
        let row = QueueMember {
            id: 0,
            queue_name: queue.name.clone(),
            usertype: MEMBER_USER.to_string(),
            category: CATEGORY_QUEUE.to_string(),
            ..member.clone()
        };
        let id = record::insert(conn, &row)?;
        QueueMemberFixes::new(conn).fix(id)?;
        info!(queue = %queue.name, user_id = member.userid, "queue member user associated");
        super::get(conn, id)
    })
}

pub fn dissociate_member_user(conn: &Connection, queue: &Queue, member: &QueueMember) -> DaoResult<()> {
    dissociate_member(conn, queue, MEMBER_USER, member.userid)
}

/// Add an agent member dialing `Agent/{number}`.
pub fn associate_member_agent(
    conn: &Connection,
    queue: &Queue,
    member: &QueueMember,
) -> DaoResult<QueueMember> {
    let agent: Agent = agent::get(conn, member.userid)?;
    let row = QueueMember {
        id: 0,
        queue_name: queue.name.clone(),
        interface: format!("{CHANNEL_AGENT}/{}", agent.number),
        usertype: MEMBER_AGENT.to_string(),
        userid: agent.id,
        channel: CHANNEL_AGENT.to_string(),
        category: CATEGORY_QUEUE.to_string(),
        ..member.clone()
    };
    let id = record::insert(conn, &row)?;
    info!(queue = %queue.name, agent_id = agent.id, "queue member agent associated");
    super::get(conn, id)
}

pub fn dissociate_member_agent(conn: &Connection, queue: &Queue, member: &QueueMember) -> DaoResult<()> {
    dissociate_member(conn, queue, MEMBER_AGENT, member.userid)
}

fn dissociate_member(conn: &Connection, queue: &Queue, usertype: &str, userid: i64) -> DaoResult<()> {
    let removed = conn.execute(
        "DELETE FROM queuemember
         WHERE queue_name = ?1 AND category = ?2 AND usertype = ?3 AND userid = ?4;",
        params![queue.name, CATEGORY_QUEUE, usertype, userid],
    )?;
    info!(queue = %queue.name, usertype, userid, removed, "queue member dissociated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointRef, Line, SipEndpoint, CHANNEL_LOCAL};
    use crate::testing;

    fn add_queue(conn: &Connection, name: &str) -> Queue {
        create(
            conn,
            &Queue {
                name: name.into(),
                displayname: name.to_uppercase(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn user_with_sip_line(conn: &Connection, sip_name: &str) -> i64 {
        let user = testing::add_user(conn, "\"Alice\"");
        let sip = testing::add_sip(conn, SipEndpoint::new(sip_name));
        let mut line = Line::new("default");
        line.set_endpoint(Some(EndpointRef::Sip(sip.id)));
        let line = testing::add_line(conn, line);
        testing::add_user_line(conn, user.id, line.id, true, true);
        user.id
    }

    #[test]
    fn test_search_by_displayname() {
        let conn = testing::setup_db();
        add_queue(&conn, "sales");
        let support = add_queue(&conn, "support");

        let result = search(&conn, &SearchParameters::new().search("PPO")).unwrap();
        assert_eq!(result.items, vec![support]);
    }

    #[test]
    fn test_associate_member_user_takes_main_line_interface() {
        let conn = testing::setup_db();
        let queue = add_queue(&conn, "sales");
        let user_id = user_with_sip_line(&conn, "abcdef");

        let member = associate_member_user(
            &conn,
            &queue,
            &QueueMember {
                userid: user_id,
                penalty: 3,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(member.interface, "SIP/abcdef");
        assert_eq!(member.channel, "SIP");
        assert_eq!(member.penalty, 3);
        assert_eq!(members(&conn, &queue).unwrap(), vec![member]);
    }

    #[test]
    fn test_associate_local_member_without_extension_keeps_interface() {
        let conn = testing::setup_db();
        let queue = add_queue(&conn, "sales");
        let user_id = user_with_sip_line(&conn, "abcdef");

        let member = associate_member_user(
            &conn,
            &queue,
            &QueueMember {
                userid: user_id,
                channel: CHANNEL_LOCAL.into(),
                interface: "Local/placeholder".into(),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(member.channel, "Local");
        assert_eq!(member.interface, "Local/placeholder");
    }

    #[test]
    fn test_associate_member_user_missing_user() {
        let conn = testing::setup_db();
        let queue = add_queue(&conn, "sales");
        let member = QueueMember {
            userid: 404,
            ..Default::default()
        };
        assert!(associate_member_user(&conn, &queue, &member)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_agent_member_lifecycle() {
        let conn = testing::setup_db();
        let queue = add_queue(&conn, "sales");
        let agent = agent::create(
            &conn,
            &Agent {
                number: "1234".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let member = associate_member_agent(
            &conn,
            &queue,
            &QueueMember {
                userid: agent.id,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(member.interface, "Agent/1234");
        assert_eq!(member.channel, "Agent");
        assert_eq!(member.usertype, "agent");

        dissociate_member_agent(&conn, &queue, &member).unwrap();
        assert!(find_member(&conn, member.id).unwrap().is_none());
    }

    #[test]
    fn test_rename_and_delete_carry_members() {
        let conn = testing::setup_db();
        let mut queue = add_queue(&conn, "sales");
        let user_id = user_with_sip_line(&conn, "abcdef");
        let member = associate_member_user(
            &conn,
            &queue,
            &QueueMember {
                userid: user_id,
                ..Default::default()
            },
        )
        .unwrap();

        queue.name = "presales".into();
        edit(&conn, &queue).unwrap();
        assert_eq!(
            find_member(&conn, member.id).unwrap().unwrap().queue_name,
            "presales"
        );

        delete(&conn, &queue).unwrap();
        assert!(find_member(&conn, member.id).unwrap().is_none());
        assert!(find(&conn, queue.id).unwrap().is_none());
    }

    #[test]
    fn test_dissociate_member_user() {
        let conn = testing::setup_db();
        let queue = add_queue(&conn, "sales");
        let user_id = user_with_sip_line(&conn, "abcdef");
        let member = associate_member_user(
            &conn,
            &queue,
            &QueueMember {
                userid: user_id,
                ..Default::default()
            },
        )
        .unwrap();

        dissociate_member_user(&conn, &queue, &member).unwrap();

        assert!(members(&conn, &queue).unwrap().is_empty());
    }
}
