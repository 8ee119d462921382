//! SIP and IAX registration lines (`register_sip`, `register_iax`).
//!
//! Registers only hold the `var_val` registration string. Trunks point at
//! them through `registerid`, see [`crate::resources::trunk`].

use std::sync::LazyLock;

use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::models::{RegisterIax, RegisterKind, RegisterSip, Trunk};
use crate::query::criteria::{criteria, find_all_by};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::resources::trunk;
use crate::store::record;
use crate::store::session::with_savepoint;

static REGISTER_SIP_SEARCH: LazyLock<SearchSystem<RegisterSip>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<RegisterSip>()
            .columns(&["id", "var_val"])
            .searchable(&["var_val"])
            .default_sort("var_val"),
    )
});

static REGISTER_IAX_SEARCH: LazyLock<SearchSystem<RegisterIax>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<RegisterIax>()
            .columns(&["id", "var_val"])
            .searchable(&["var_val"])
            .default_sort("var_val"),
    )
});

pub fn search_sip(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<RegisterSip>> {
    REGISTER_SIP_SEARCH.search(conn, params)
}

pub fn find_sip(conn: &Connection, id: i64) -> DaoResult<Option<RegisterSip>> {
    super::find(conn, id)
}

pub fn get_sip(conn: &Connection, id: i64) -> DaoResult<RegisterSip> {
    super::get(conn, id)
}

pub fn create_sip(conn: &Connection, register: &RegisterSip) -> DaoResult<RegisterSip> {
    super::create(conn, register)
}

pub fn edit_sip(conn: &Connection, register: &RegisterSip) -> DaoResult<()> {
    record::update(conn, register)
}

/// Delete the register and detach it from any trunk using it.
pub fn delete_sip(conn: &Connection, register: &RegisterSip) -> DaoResult<()> {
    with_savepoint(conn, "register_sip_delete", |conn| {
        record::delete(conn, register)?;
        detach_trunks(conn, RegisterKind::Sip, register.id)
    })
}

pub fn search_iax(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<RegisterIax>> {
    REGISTER_IAX_SEARCH.search(conn, params)
}

pub fn find_iax(conn: &Connection, id: i64) -> DaoResult<Option<RegisterIax>> {
    super::find(conn, id)
}

pub fn get_iax(conn: &Connection, id: i64) -> DaoResult<RegisterIax> {
    super::get(conn, id)
}

pub fn create_iax(conn: &Connection, register: &RegisterIax) -> DaoResult<RegisterIax> {
    super::create(conn, register)
}

pub fn edit_iax(conn: &Connection, register: &RegisterIax) -> DaoResult<()> {
    record::update(conn, register)
}

pub fn delete_iax(conn: &Connection, register: &RegisterIax) -> DaoResult<()> {
    with_savepoint(conn, "register_iax_delete", |conn| {
        record::delete(conn, register)?;
        detach_trunks(conn, RegisterKind::Iax, register.id)
    })
}

/// Ids are per table, so a trunk attached to the other register table with
/// the same id is left alone by the protocol check in `dissociate_register`.
fn detach_trunks(conn: &Connection, kind: RegisterKind, register_id: i64) -> DaoResult<()> {
    let trunks: Vec<Trunk> = find_all_by(conn, &criteria([("registerid", register_id)]))?;
    for trunk in trunks {
        trunk::dissociate_register(conn, trunk.id, kind, register_id)?;
    }
    Ok(())
}

pub(crate) fn delete_sip_by_id(conn: &Connection, id: i64) -> DaoResult<()> {
    conn.execute("DELETE FROM register_sip WHERE id = ?1;", [id])?;
    Ok(())
}

pub(crate) fn delete_iax_by_id(conn: &Connection, id: i64) -> DaoResult<()> {
    conn.execute("DELETE FROM register_iax WHERE id = ?1;", [id])?;
    Ok(())
}
