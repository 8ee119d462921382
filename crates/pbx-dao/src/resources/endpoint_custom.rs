//! Custom endpoints (`usercustom`): a free-form dial interface.

use std::sync::LazyLock;

use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::models::{CustomEndpoint, EndpointRef, TrunkEndpointRef};
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::store::record;
use crate::store::session::with_savepoint;

static CUSTOM_SEARCH: LazyLock<SearchSystem<CustomEndpoint>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<CustomEndpoint>()
            .columns(&["id", "name", "context", "interface"])
            .searchable(&["name", "context", "interface"])
            .default_sort("interface"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<CustomEndpoint>> {
    CUSTOM_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<CustomEndpoint>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<CustomEndpoint> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<CustomEndpoint>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<CustomEndpoint> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<CustomEndpoint>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, custom: &CustomEndpoint) -> DaoResult<CustomEndpoint> {
    super::create(conn, custom)
}

pub fn edit(conn: &Connection, custom: &CustomEndpoint) -> DaoResult<()> {
    with_savepoint(conn, "endpoint_custom_edit", |conn| {
        record::update(conn, custom)?;
        super::refresh_lines(conn, EndpointRef::Custom(custom.id))?;
        super::refresh_trunks(conn, TrunkEndpointRef::Custom(custom.id))?;
        Ok(())
    })
}

/// Delete the endpoint; lines and trunks that pointed at it are detached.
pub fn delete(conn: &Connection, custom: &CustomEndpoint) -> DaoResult<()> {
    with_savepoint(conn, "endpoint_custom_delete", |conn| {
        record::delete(conn, custom)?;
        super::refresh_lines(conn, EndpointRef::Custom(custom.id))?;
        super::refresh_trunks(conn, TrunkEndpointRef::Custom(custom.id))?;
        Ok(())
    })
}

pub(crate) fn delete_by_id(conn: &Connection, id: i64) -> DaoResult<()> {
    conn.execute("DELETE FROM usercustom WHERE id = ?1;", [id])?;
    Ok(())
}
