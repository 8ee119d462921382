//! Schedules (`schedule`). The fallback action is stored as a single
//! `type:subtype` string, see [`Schedule::action_type`].

use std::sync::LazyLock;

use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::models::{Schedule};
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::store::record;

static SCHEDULE_SEARCH: LazyLock<SearchSystem<Schedule>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<Schedule>()
            .columns(&["id", "name", "timezone", "description"])
            .searchable(&["name", "timezone", "description"])
            .default_sort("name"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<Schedule>> {
    SCHEDULE_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<Schedule>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<Schedule> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<Schedule>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Schedule> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<Schedule>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, schedule: &Schedule) -> DaoResult<Schedule> {
    super::create(conn, schedule)
}

pub fn edit(conn: &Connection, schedule: &Schedule) -> DaoResult<()> {
    record::update(conn, schedule)
}

pub fn delete(conn: &Connection, schedule: &Schedule) -> DaoResult<()> {
    record::delete(conn, schedule)
}
