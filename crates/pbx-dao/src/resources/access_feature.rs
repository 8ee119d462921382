//! Hosts allowed to reach a feature (`accessfeatures`).

use std::sync::LazyLock;

use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::models::{AccessFeature};
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::store::record;

static ACCESS_FEATURE_SEARCH: LazyLock<SearchSystem<AccessFeature>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<AccessFeature>()
            .columns(&["id", "host", "feature", "commented"])
            .column("enabled", "commented = 0")
            .searchable(&["host", "feature"])
            .default_sort("host"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<AccessFeature>> {
    ACCESS_FEATURE_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<AccessFeature>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<AccessFeature> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<AccessFeature>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<AccessFeature> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<AccessFeature>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, access_feature: &AccessFeature) -> DaoResult<AccessFeature> {
    super::create(conn, access_feature)
}

pub fn edit(conn: &Connection, access_feature: &AccessFeature) -> DaoResult<()> {
    record::update(conn, access_feature)
}

pub fn delete(conn: &Connection, access_feature: &AccessFeature) -> DaoResult<()> {
    record::delete(conn, access_feature)
}
