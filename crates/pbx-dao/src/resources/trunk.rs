//! Trunks, their endpoint and their outbound registration.
//!
//! A trunk's `protocol` does double duty: it selects the endpoint table for
//! `protocolid` and the register table for `registerid`. A trunk can
//! therefore register through SIP only when it is not already an IAX trunk,
//! and the other way round.

use std::sync::LazyLock;

use rusqlite::Connection;
use tracing::info;

use crate::errors::{DaoError, DaoResult};
use crate::fixes::TrunkFixes;
use crate::models::{
    RegisterIax, RegisterKind, RegisterSip, ResolvedTrunkEndpoint, Resolution, Trunk,
    TrunkEndpointRef, PROTOCOL_CUSTOM, PROTOCOL_IAX, PROTOCOL_SIP,
};
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::resources::{endpoint_custom, endpoint_iax, endpoint_sip, register};
use crate::store::record;
use crate::store::session::with_savepoint;

static TRUNK_SEARCH: LazyLock<SearchSystem<Trunk>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<Trunk>()
            .columns(&["id", "context", "description", "protocol"])
            .searchable(&["context", "description"])
            .default_sort("context"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<Trunk>> {
    TRUNK_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<Trunk>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<Trunk> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<Trunk>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Trunk> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<Trunk>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, trunk: &Trunk) -> DaoResult<Trunk> {
    super::create(conn, trunk)
}

pub fn edit(conn: &Connection, trunk: &Trunk) -> DaoResult<()> {
    with_savepoint(conn, "trunk_edit", |conn| {
        record::update(conn, trunk)?;
        TrunkFixes::new(conn).fix(trunk.id)
    })
}

/// Delete the trunk together with its endpoint and register rows.
pub fn delete(conn: &Connection, trunk: &Trunk) -> DaoResult<()> {
    with_savepoint(conn, "trunk_delete", |conn| {
        match trunk.endpoint() {
            Some(TrunkEndpointRef::Sip(id)) => endpoint_sip::delete_by_id(conn, id)?,
            Some(TrunkEndpointRef::Iax(id)) => endpoint_iax::delete_by_id(conn, id)?,
            Some(TrunkEndpointRef::Custom(id)) => endpoint_custom::delete_by_id(conn, id)?,
            None => {}
        }
        if trunk.registerid != 0 {
            match trunk.register_kind() {
                Some(RegisterKind::Sip) => register::delete_sip_by_id(conn, trunk.registerid)?,
                Some(RegisterKind::Iax) => register::delete_iax_by_id(conn, trunk.registerid)?,
                None => {}
            }
        }
        record::delete(conn, trunk)?;
        info!(trunk_id = trunk.id, "trunk deleted");
        Ok(())
    })
}

pub fn resolve_endpoint(
    conn: &Connection,
    trunk: &Trunk,
) -> DaoResult<Resolution<ResolvedTrunkEndpoint>> {
    let Some(endpoint) = trunk.endpoint() else {
        let known_protocol = matches!(
            trunk.protocol.as_deref(),
            None | Some(PROTOCOL_SIP) | Some(PROTOCOL_IAX) | Some(PROTOCOL_CUSTOM)
        );
        // A protocol without an id is a register-only trunk, not a dangling one.
        return Ok(if trunk.protocolid.is_none() && known_protocol {
            Resolution::Unbound
        } else {
            Resolution::Dangling
        });
    };
    let resolved = match endpoint {
        TrunkEndpointRef::Sip(id) => endpoint_sip::find(conn, id)?.map(ResolvedTrunkEndpoint::Sip),
        TrunkEndpointRef::Iax(id) => endpoint_iax::find(conn, id)?.map(ResolvedTrunkEndpoint::Iax),
        TrunkEndpointRef::Custom(id) => {
            endpoint_custom::find(conn, id)?.map(ResolvedTrunkEndpoint::Custom)
        }
    };
    Ok(match resolved {
        Some(e) => Resolution::Resolved(e),
        None => Resolution::Dangling,
    })
}

pub fn associate_endpoint(
    conn: &Connection,
    trunk_id: i64,
    endpoint: TrunkEndpointRef,
) -> DaoResult<()> {
    let mut trunk = get(conn, trunk_id)?;
    let (protocol, _) = endpoint.to_columns();
    if trunk.registerid != 0 && trunk.protocol.as_deref().is_some_and(|p| p != protocol) {
        return Err(conflict(&trunk, protocol));
    }
    trunk.set_endpoint(Some(endpoint));
    edit(conn, &trunk)
}

pub fn dissociate_endpoint(conn: &Connection, trunk_id: i64) -> DaoResult<()> {
    let mut trunk = get(conn, trunk_id)?;
    trunk.protocolid = None;
    if trunk.registerid == 0 {
        trunk.protocol = None;
    }
    edit(conn, &trunk)
}

// ---------------------------------------------------------------------------
// Registers
// ---------------------------------------------------------------------------

pub fn associate_register_sip(conn: &Connection, trunk: &Trunk, register: &RegisterSip) -> DaoResult<()> {
    associate_register(conn, trunk.id, RegisterKind::Sip, register.id)
}

pub fn dissociate_register_sip(conn: &Connection, trunk: &Trunk, register: &RegisterSip) -> DaoResult<()> {
    dissociate_register(conn, trunk.id, RegisterKind::Sip, register.id)
}

pub fn associate_register_iax(conn: &Connection, trunk: &Trunk, register: &RegisterIax) -> DaoResult<()> {
    associate_register(conn, trunk.id, RegisterKind::Iax, register.id)
}

pub fn dissociate_register_iax(conn: &Connection, trunk: &Trunk, register: &RegisterIax) -> DaoResult<()> {
    dissociate_register(conn, trunk.id, RegisterKind::Iax, register.id)
}

/// Attach a register when the trunk has no protocol yet or already speaks
/// the register's protocol. A conflict writes nothing.
fn associate_register(
    conn: &Connection,
    trunk_id: i64,
    kind: RegisterKind,
    register_id: i64,
) -> DaoResult<()> {
    let mut trunk = get(conn, trunk_id)?;
    if trunk.protocol.as_deref().is_some_and(|p| p != kind.protocol()) {
        return Err(conflict(&trunk, kind.protocol()));
    }
    trunk.protocol = Some(kind.protocol().to_string());
    trunk.registerid = register_id;
    record::update(conn, &trunk)?;
    info!(trunk_id, register_id, protocol = kind.protocol(), "register associated");
    Ok(())
}

/// Detach the register if it is the one attached; otherwise a no-op.
pub(crate) fn dissociate_register(
    conn: &Connection,
    trunk_id: i64,
    kind: RegisterKind,
    register_id: i64,
) -> DaoResult<()> {
    let mut trunk = get(conn, trunk_id)?;
    if trunk.registerid != register_id || trunk.register_kind() != Some(kind) {
        return Ok(());
    }
    trunk.registerid = 0;
    if trunk.protocolid.is_none() {
        trunk.protocol = None;
    }
    record::update(conn, &trunk)?;
    info!(trunk_id, register_id, protocol = kind.protocol(), "register dissociated");
    Ok(())
}

fn conflict(trunk: &Trunk, requested: &str) -> DaoError {
    DaoError::resource(
        "Trunk",
        format!(
            "trunk {} uses protocol {}, cannot associate {requested}",
            trunk.id,
            trunk.protocol.as_deref().unwrap_or("none")
        ),
    )
}
