use std::sync::LazyLock;

use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::models::{Paging};
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::store::record;

static PAGING_SEARCH: LazyLock<SearchSystem<Paging>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<Paging>()
            .columns(&["id", "name", "number", "announce_sound"])
            .searchable(&["name", "number"])
            .default_sort("name"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<Paging>> {
    PAGING_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<Paging>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<Paging> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<Paging>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Paging> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<Paging>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, paging: &Paging) -> DaoResult<Paging> {
    super::create(conn, paging)
}

pub fn edit(conn: &Connection, paging: &Paging) -> DaoResult<()> {
    record::update(conn, paging)
}

pub fn delete(conn: &Connection, paging: &Paging) -> DaoResult<()> {
    record::delete(conn, paging)
}
