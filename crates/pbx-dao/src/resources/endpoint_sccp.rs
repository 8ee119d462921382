//! SCCP endpoints (`sccpline`).

use std::sync::LazyLock;

use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::models::{EndpointRef, SccpEndpoint};
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::store::record;
use crate::store::session::with_savepoint;

static SCCP_SEARCH: LazyLock<SearchSystem<SccpEndpoint>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<SccpEndpoint>()
            .columns(&["id", "name", "cid_name", "cid_num"])
            .searchable(&["name", "cid_name", "cid_num"])
            .default_sort("name"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<SccpEndpoint>> {
    SCCP_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<SccpEndpoint>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<SccpEndpoint> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<SccpEndpoint>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<SccpEndpoint> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<SccpEndpoint>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, sccp: &SccpEndpoint) -> DaoResult<SccpEndpoint> {
    super::create(conn, sccp)
}

pub fn edit(conn: &Connection, sccp: &SccpEndpoint) -> DaoResult<()> {
    with_savepoint(conn, "endpoint_sccp_edit", |conn| {
        record::update(conn, sccp)?;
        super::refresh_lines(conn, EndpointRef::Sccp(sccp.id))?;
        Ok(())
    })
}

/// Lines that pointed at the endpoint lose their reference.
pub fn delete(conn: &Connection, sccp: &SccpEndpoint) -> DaoResult<()> {
    with_savepoint(conn, "endpoint_sccp_delete", |conn| {
        record::delete(conn, sccp)?;
        super::refresh_lines(conn, EndpointRef::Sccp(sccp.id))?;
        Ok(())
    })
}
