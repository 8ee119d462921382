//! Lines and the endpoint each one points at.

use std::sync::LazyLock;

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::errors::{DaoError, DaoResult};
use crate::fixes::LineFixes;
use crate::models::{
    EndpointRef, Extension, Line, ResolvedEndpoint, Resolution, PROTOCOL_CUSTOM,
};
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::resources::{endpoint_custom, endpoint_sccp, endpoint_sip};
use crate::store::record::{self, select_list, Record};
use crate::store::session::with_savepoint;

static LINE_SEARCH: LazyLock<SearchSystem<Line>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<Line>()
            .columns(&["id", "name", "number", "context", "protocol", "description"])
            .column("provisioning_code", "provisioningid")
            .searchable(&["name", "number", "context", "description"])
            .default_sort("name"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<Line>> {
    LINE_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<Line>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<Line> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<Line>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Line> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<Line>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, line: &Line) -> DaoResult<Line> {
    super::create(conn, line)
}

/// Write `line` and recompute its derived fields.
pub fn edit(conn: &Connection, line: &Line) -> DaoResult<()> {
    with_savepoint(conn, "line_edit", |conn| {
        record::update(conn, line)?;
        LineFixes::new(conn).fix(line.id)
    })
}

/// Association rows go with the line through `ON DELETE CASCADE`.
pub fn delete(conn: &Connection, line: &Line) -> DaoResult<()> {
    record::delete(conn, line)
}

pub fn associate_endpoint(conn: &Connection, line_id: i64, endpoint: EndpointRef) -> DaoResult<()> {
    let mut line = get(conn, line_id)?;
    line.set_endpoint(Some(endpoint));
    edit(conn, &line)
}

pub fn dissociate_endpoint(conn: &Connection, line_id: i64) -> DaoResult<()> {
    let mut line = get(conn, line_id)?;
    line.set_endpoint(None);
    edit(conn, &line)
}

/// Follow the line's discriminator to its endpoint row.
pub fn resolve_endpoint(conn: &Connection, line: &Line) -> DaoResult<Resolution<ResolvedEndpoint>> {
    let Some(endpoint) = line.endpoint() else {
        return Ok(if line.has_discriminator() {
            Resolution::Dangling
        } else {
            Resolution::Unbound
        });
    };
    let resolved = match endpoint {
        EndpointRef::Sip(id) => endpoint_sip::find(conn, id)?.map(ResolvedEndpoint::Sip),
        EndpointRef::Sccp(id) => endpoint_sccp::find(conn, id)?.map(ResolvedEndpoint::Sccp),
        EndpointRef::Custom(id) => endpoint_custom::find(conn, id)?.map(ResolvedEndpoint::Custom),
    };
    Ok(match resolved {
        Some(e) => Resolution::Resolved(e),
        None => Resolution::Dangling,
    })
}

/// The line's extension, preferring the one flagged main.
pub fn main_extension(conn: &Connection, line_id: i64) -> DaoResult<Option<Extension>> {
    let sql = format!(
        "SELECT {} FROM extensions WHERE id = (
             SELECT extension_id FROM line_extension WHERE line_id = ?1
             ORDER BY main_extension DESC, extension_id ASC LIMIT 1
         );",
        select_list::<Extension>()
    );
    let extension = conn
        .query_row(&sql, [line_id], Extension::from_row)
        .optional()?;
    Ok(extension)
}

/// Dial interface of the line reached through `exten@context`.
///
/// A line that is some user's main line wins over the others; `NotFound`
/// when no line with a name and protocol carries that extension.
pub fn interface_for_extension(conn: &Connection, exten: &str, context: &str) -> DaoResult<String> {
    let mut stmt = conn.prepare(
        "SELECT l.protocol, l.name
         FROM linefeatures l
         JOIN line_extension le ON le.line_id = l.id
         JOIN extensions e ON e.id = le.extension_id
         WHERE e.exten = ?1 AND e.context = ?2
         ORDER BY EXISTS (
             SELECT 1 FROM user_line ul WHERE ul.line_id = l.id AND ul.main_line = 1
         ) DESC, l.id ASC;",
    )?;
    let rows = stmt
        .query_map([exten, context], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<String>>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let interface = rows
        .into_iter()
        .find_map(|(protocol, name)| format_interface(protocol.as_deref()?, name.as_deref()?));
    debug!(exten, context, interface = ?interface, "interface for extension");
    interface.ok_or_else(|| DaoError::not_found("Line", format!("exten={exten}, context={context}")))
}

fn format_interface(protocol: &str, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    if protocol == PROTOCOL_CUSTOM {
        Some(name.to_string())
    } else {
        Some(format!("{}/{}", protocol.to_uppercase(), name))
    }
}
