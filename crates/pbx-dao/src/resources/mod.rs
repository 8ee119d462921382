//! Per-entity data access.
//!
//! Each module exposes the same query surface for its record type (find,
//! get, find_by, get_by, find_all_by, search, create, edit, delete) plus the
//! association operations that belong to it. Operations that change a
//! line, user or trunk run the matching fixes before returning.

pub mod access_feature;
pub mod agent;
pub mod endpoint_custom;
pub mod endpoint_iax;
pub mod endpoint_sccp;
pub mod endpoint_sip;
pub mod extension;
pub mod line;
pub mod line_extension;
pub mod moh;
pub mod paging;
pub mod queue;
pub mod register;
pub mod schedule;
pub mod trunk;
pub mod user;
pub mod user_line;

use rusqlite::types::Value;
use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::fixes::{LineFixes, TrunkFixes};
use crate::models::{EndpointRef, Line, Trunk, TrunkEndpointRef};
use crate::query::criteria::{criteria, find_all_by, find_by, get_by, Criteria};
use crate::query::search::{SearchConfigBuilder, SearchSystem};
use crate::store::record::{self, Record};

pub(crate) fn find<T: Record>(conn: &Connection, id: i64) -> DaoResult<Option<T>> {
    find_by(conn, &criteria([("id", id)]))
}

pub(crate) fn get<T: Record>(conn: &Connection, id: i64) -> DaoResult<T> {
    get_by(conn, &criteria([("id", id)]))
}

/// Insert `row` and read it back with its assigned id.
pub(crate) fn create<T: Record>(conn: &Connection, row: &T) -> DaoResult<T> {
    let id = record::insert(conn, row)?;
    get(conn, id)
}

/// Build a resource's search system. The configs are static, so a bad one is
/// a programming error caught by each module's tests.
pub(crate) fn search_system<T: Record>(builder: SearchConfigBuilder) -> SearchSystem<T> {
    match builder.build() {
        Ok(config) => SearchSystem::new(config),
        Err(e) => panic!("invalid search config for {}: {e}", T::RESOURCE),
    }
}

fn endpoint_criteria(protocol: &str, id: i64) -> Criteria {
    criteria([
        ("protocol", Value::Text(protocol.to_string())),
        ("protocolid", Value::Integer(id)),
    ])
}

/// Re-run line fixes on every line that points at `endpoint`.
pub(crate) fn refresh_lines(conn: &Connection, endpoint: EndpointRef) -> DaoResult<()> {
    let (protocol, id) = endpoint.to_columns();
    let lines: Vec<Line> = find_all_by(conn, &endpoint_criteria(protocol, id))?;
    for line in lines {
        LineFixes::new(conn).fix(line.id)?;
    }
    Ok(())
}

pub(crate) fn refresh_trunks(conn: &Connection, endpoint: TrunkEndpointRef) -> DaoResult<()> {
    let (protocol, id) = endpoint.to_columns();
    let trunks: Vec<Trunk> = find_all_by(conn, &endpoint_criteria(protocol, id))?;
    for trunk in trunks {
        TrunkFixes::new(conn).fix(trunk.id)?;
    }
    Ok(())
}
