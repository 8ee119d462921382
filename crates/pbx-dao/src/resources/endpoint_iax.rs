//! IAX endpoints (`useriax`), used by trunks only.

use std::sync::LazyLock;

use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::models::{IaxEndpoint, TrunkEndpointRef};
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::store::record;
use crate::store::session::with_savepoint;

static IAX_SEARCH: LazyLock<SearchSystem<IaxEndpoint>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<IaxEndpoint>()
            .columns(&["id", "name", "context", "host", "type"])
            .searchable(&["name", "context", "host"])
            .default_sort("name"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<IaxEndpoint>> {
    IAX_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<IaxEndpoint>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<IaxEndpoint> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<IaxEndpoint>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<IaxEndpoint> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<IaxEndpoint>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, iax: &IaxEndpoint) -> DaoResult<IaxEndpoint> {
    super::create(conn, iax)
}

/// The trunk context is pushed back down by the trunk fixes.
pub fn edit(conn: &Connection, iax: &IaxEndpoint) -> DaoResult<()> {
    with_savepoint(conn, "endpoint_iax_edit", |conn| {
        record::update(conn, iax)?;
        super::refresh_trunks(conn, TrunkEndpointRef::Iax(iax.id))?;
        Ok(())
    })
}

/// Trunks that pointed at the endpoint keep only their register.
pub fn delete(conn: &Connection, iax: &IaxEndpoint) -> DaoResult<()> {
    with_savepoint(conn, "endpoint_iax_delete", |conn| {
        record::delete(conn, iax)?;
        super::refresh_trunks(conn, TrunkEndpointRef::Iax(iax.id))?;
        Ok(())
    })
}

pub(crate) fn delete_by_id(conn: &Connection, id: i64) -> DaoResult<()> {
    conn.execute("DELETE FROM useriax WHERE id = ?1;", [id])?;
    Ok(())
}
