//! Music on hold classes (`moh`).

use std::sync::LazyLock;

use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::models::{Moh};
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::store::record;

static MOH_SEARCH: LazyLock<SearchSystem<Moh>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<Moh>()
            .columns(&["id", "name", "label", "mode"])
            .searchable(&["name", "label"])
            .default_sort("label"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<Moh>> {
    MOH_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<Moh>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<Moh> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<Moh>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Moh> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<Moh>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, moh: &Moh) -> DaoResult<Moh> {
    super::create(conn, moh)
}

pub fn edit(conn: &Connection, moh: &Moh) -> DaoResult<()> {
    record::update(conn, moh)
}

pub fn delete(conn: &Connection, moh: &Moh) -> DaoResult<()> {
    record::delete(conn, moh)
}
