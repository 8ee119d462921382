//! Users (`userfeatures`) and their caller id.

use std::sync::LazyLock;

use rusqlite::Connection;
use tracing::info;

use crate::errors::DaoResult;
use crate::fixes::{LineFixes, UserFixes};
use crate::models::{CallerId, User, MEMBER_USER};
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::resources::user_line;
use crate::store::record;
use crate::store::session::with_savepoint;

static USER_SEARCH: LazyLock<SearchSystem<User>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<User>()
            .columns(&["id", "firstname", "lastname", "callerid", "email", "description"])
            .column("fullname", "firstname || ' ' || lastname")
            .searchable(&["fullname", "callerid", "email", "description"])
            .default_sort("lastname"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<User>> {
    USER_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<User>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<User> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<User>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<User> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<User>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, user: &User) -> DaoResult<User> {
    super::create(conn, user)
}

/// Write `user`, then refresh every line and queue member derived from it.
pub fn edit(conn: &Connection, user: &User) -> DaoResult<()> {
    with_savepoint(conn, "user_edit", |conn| {
        record::update(conn, user)?;
        UserFixes::new(conn).fix(user.id)
    })
}

/// Delete the user with its queue memberships. Lines it was main user of get
/// a new main user when one is left.
pub fn delete(conn: &Connection, user: &User) -> DaoResult<()> {
    with_savepoint(conn, "user_delete", |conn| {
        let line_ids = line_ids(conn, user.id)?;
        conn.execute(
            "DELETE FROM queuemember WHERE usertype = ?1 AND userid = ?2;",
            rusqlite::params![MEMBER_USER, user.id],
        )?;
        record::delete(conn, user)?;
        for line_id in line_ids {
            user_line::ensure_main_user(conn, line_id)?;
            LineFixes::new(conn).fix(line_id)?;
        }
        info!(user_id = user.id, "user deleted");
        Ok(())
    })
}

/// Ids of the user's lines, main line first.
pub fn line_ids(conn: &Connection, user_id: i64) -> DaoResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT line_id FROM user_line WHERE user_id = ?1
         ORDER BY main_line DESC, line_id ASC;",
    )?;
    let ids = stmt
        .query_map([user_id], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

/// The user's caller id; without a stored one the full name stands in.
pub fn caller_id(user: &User) -> CallerId {
    user.callerid
        .as_deref()
        .and_then(CallerId::parse)
        .unwrap_or_else(|| CallerId {
            name: user.fullname(),
            number: None,
        })
}

pub fn caller_id_name(user: &User) -> String {
    caller_id(user).name
}

/// Store `"name" <number>`, or `"name"` without a number.
pub fn set_caller_id(user: &mut User, name: &str, number: Option<&str>) {
    let caller_id = CallerId {
        name: name.to_string(),
        number: number.filter(|n| !n.is_empty()).map(str::to_string),
    };
    user.callerid = Some(caller_id.format());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointRef, Line, SipEndpoint};
    use crate::query::criteria::criteria;
    use crate::resources::{endpoint_sip, queue};
    use crate::testing;

    fn named(conn: &Connection, firstname: &str, lastname: &str) -> User {
        create(
            conn,
            &User {
                firstname: firstname.into(),
                lastname: lastname.into(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_caller_id_falls_back_to_fullname() {
        let user = User {
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            ..Default::default()
        };
        assert_eq!(caller_id_name(&user), "Ada Lovelace");
        assert_eq!(caller_id(&user).number, None);
    }

    #[test]
    fn test_set_caller_id() {
        let mut user = User::default();
        set_caller_id(&mut user, "Ada", Some("1000"));
        assert_eq!(user.callerid.as_deref(), Some("\"Ada\" <1000>"));
        set_caller_id(&mut user, "Ada", Some(""));
        assert_eq!(user.callerid.as_deref(), Some("\"Ada\""));
        assert_eq!(caller_id_name(&user), "Ada");
    }

    #[test]
    fn test_search_on_fullname() {
        let conn = testing::setup_db();
        named(&conn, "Ada", "Lovelace");
        let grace = named(&conn, "Grace", "Hopper");
        named(&conn, "Alan", "Turing");

        let result = search(&conn, &SearchParameters::new().search("ace hop")).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.items, vec![grace]);

        let all = search(&conn, &SearchParameters::new()).unwrap();
        let lastnames: Vec<_> = all.items.iter().map(|u| u.lastname.as_str()).collect();
        assert_eq!(lastnames, ["Hopper", "Lovelace", "Turing"]);
    }

    #[test]
    fn test_find_by_line_relation() {
        let conn = testing::setup_db();
        let user = testing::add_user(&conn, "\"Alice\"");
        testing::add_user(&conn, "\"Bob\"");
        let line = testing::add_line(&conn, Line::new("default"));
        testing::add_user_line(&conn, user.id, line.id, true, true);

        let found = find_all_by(&conn, &criteria([("line_id", line.id)])).unwrap();
        assert_eq!(found, vec![user]);
    }

    #[test]
    fn test_edit_pushes_caller_id_to_sip() {
        let conn = testing::setup_db();
        let mut user = testing::add_user(&conn, "\"Alice\"");
        let sip = testing::add_sip(&conn, SipEndpoint::new("abc"));
        let mut line = Line::new("default");
        line.set_endpoint(Some(EndpointRef::Sip(sip.id)));
        let line = testing::add_line(&conn, line);
        testing::add_user_line(&conn, user.id, line.id, true, true);

        set_caller_id(&mut user, "Alice Cooper", Some("1234"));
        edit(&conn, &user).unwrap();

        assert_eq!(
            endpoint_sip::get(&conn, sip.id).unwrap().callerid.as_deref(),
            Some("\"Alice Cooper\" <1234>")
        );
    }

    #[test]
    fn test_delete_removes_memberships_and_promotes_main_user() {
        let conn = testing::setup_db();
        let first = testing::add_user(&conn, "\"First\"");
        let second = testing::add_user(&conn, "\"Second\"");
        let line = testing::add_line(&conn, Line::new("default"));
        testing::add_user_line(&conn, first.id, line.id, true, true);
        testing::add_user_line(&conn, second.id, line.id, false, true);
        let member = testing::add_queue_member(&conn, "q1", first.id, "SIP/abc", "SIP");

        delete(&conn, &first).unwrap();

        assert!(find(&conn, first.id).unwrap().is_none());
        assert!(queue::find_member(&conn, member.id).unwrap().is_none());
        let rows = user_line::find_all_by_line(&conn, line.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].main_user);
        assert_eq!(rows[0].user_id, second.id);
    }
}
