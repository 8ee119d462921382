//! SIP endpoints (`usersip`).

use std::sync::LazyLock;

use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::models::{EndpointRef, SipEndpoint, TrunkEndpointRef};
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::store::record;
use crate::store::session::with_savepoint;

static SIP_SEARCH: LazyLock<SearchSystem<SipEndpoint>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<SipEndpoint>()
            .columns(&["id", "name", "context", "host", "type"])
            .searchable(&["name", "context", "host"])
            .default_sort("name"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<SipEndpoint>> {
    SIP_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<SipEndpoint>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<SipEndpoint> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<SipEndpoint>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<SipEndpoint> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<SipEndpoint>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, sip: &SipEndpoint) -> DaoResult<SipEndpoint> {
    super::create(conn, sip)
}

/// Write the endpoint, then refresh whatever caches its values.
pub fn edit(conn: &Connection, sip: &SipEndpoint) -> DaoResult<()> {
    with_savepoint(conn, "endpoint_sip_edit", |conn| {
        record::update(conn, sip)?;
        super::refresh_lines(conn, EndpointRef::Sip(sip.id))?;
        super::refresh_trunks(conn, TrunkEndpointRef::Sip(sip.id))?;
        Ok(())
    })
}

/// Delete the endpoint; lines and trunks that pointed at it are detached.
pub fn delete(conn: &Connection, sip: &SipEndpoint) -> DaoResult<()> {
    with_savepoint(conn, "endpoint_sip_delete", |conn| {
        record::delete(conn, sip)?;
        super::refresh_lines(conn, EndpointRef::Sip(sip.id))?;
        super::refresh_trunks(conn, TrunkEndpointRef::Sip(sip.id))?;
        Ok(())
    })
}

pub(crate) fn delete_by_id(conn: &Connection, id: i64) -> DaoResult<()> {
    conn.execute("DELETE FROM usersip WHERE id = ?1;", [id])?;
    Ok(())
}
