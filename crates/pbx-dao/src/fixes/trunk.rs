use rusqlite::Connection;
use tracing::{debug, warn};

use crate::errors::DaoResult;
use crate::models::{RegisterKind, ResolvedTrunkEndpoint, Resolution};
use crate::resources::{register, trunk};
use crate::store::record;
use crate::store::session::with_savepoint;

/// Clears dangling trunk references and pushes the trunk context down to
/// its endpoint.
pub struct TrunkFixes<'c> {
    conn: &'c Connection,
}

impl<'c> TrunkFixes<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn fix(&self, trunk_id: i64) -> DaoResult<()> {
        with_savepoint(self.conn, "trunk_fixes", |conn| fix_trunk(conn, trunk_id))
    }
}

fn fix_trunk(conn: &Connection, trunk_id: i64) -> DaoResult<()> {
    let mut trunk = trunk::get(conn, trunk_id)?;
    let before = trunk.clone();

    let resolution = trunk::resolve_endpoint(conn, &trunk)?;
    if resolution == Resolution::Dangling {
        warn!(
            trunk_id,
            protocol = ?trunk.protocol,
            protocolid = ?trunk.protocolid,
            "trunk points at a missing endpoint, clearing it"
        );
        trunk.protocolid = None;
        if trunk.registerid == 0 || trunk.register_kind().is_none() {
            trunk.protocol = None;
        }
    }

    if trunk.registerid != 0 {
        let present = match trunk.register_kind() {
            Some(RegisterKind::Sip) => register::find_sip(conn, trunk.registerid)?.is_some(),
            Some(RegisterKind::Iax) => register::find_iax(conn, trunk.registerid)?.is_some(),
            None => false,
        };
        if !present {
            warn!(trunk_id, registerid = trunk.registerid, "trunk register is gone, clearing it");
            trunk.registerid = 0;
            if trunk.protocolid.is_none() {
                trunk.protocol = None;
            }
        }
    }

    if trunk != before {
        debug!(trunk_id, protocol = ?trunk.protocol, registerid = trunk.registerid, "trunk rewritten");
        record::update(conn, &trunk)?;
    }

    if let Resolution::Resolved(endpoint) = resolution {
        let context = trunk.context.clone();
        match endpoint {
            ResolvedTrunkEndpoint::Sip(mut sip) if sip.context != context => {
                sip.context = context;
                record::update(conn, &sip)?;
            }
            ResolvedTrunkEndpoint::Iax(mut iax) if iax.context != context => {
                iax.context = context;
                record::update(conn, &iax)?;
            }
            ResolvedTrunkEndpoint::Custom(mut custom) if custom.context != context => {
                custom.context = context;
                record::update(conn, &custom)?;
            }
            _ => {}
        }
    }
    Ok(())
}
