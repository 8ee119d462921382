//! Queue agents (`agentfeatures`).

use std::sync::LazyLock;

use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::models::{Agent};
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::store::record;

static AGENT_SEARCH: LazyLock<SearchSystem<Agent>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<Agent>()
            .columns(&["id", "number", "firstname", "lastname", "description"])
            .searchable(&["number", "firstname", "lastname", "description"])
            .default_sort("number"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<Agent>> {
    AGENT_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<Agent>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<Agent> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<Agent>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Agent> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<Agent>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, agent: &Agent) -> DaoResult<Agent> {
    super::create(conn, agent)
}

pub fn edit(conn: &Connection, agent: &Agent) -> DaoResult<()> {
    record::update(conn, agent)
}

pub fn delete(conn: &Connection, agent: &Agent) -> DaoResult<()> {
    record::delete(conn, agent)
}
