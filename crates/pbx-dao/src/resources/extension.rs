//! Dialplan extensions (`extensions`).

use std::sync::LazyLock;

use rusqlite::Connection;

use crate::errors::DaoResult;
use crate::fixes::LineFixes;
use crate::models::Extension;
use crate::query::criteria::{self, Criteria};
use crate::query::search::{SearchConfig, SearchParameters, SearchResult, SearchSystem};
use crate::store::record;
use crate::store::session::with_savepoint;

static EXTENSION_SEARCH: LazyLock<SearchSystem<Extension>> = LazyLock::new(|| {
    super::search_system(
        SearchConfig::for_record::<Extension>()
            .columns(&["id", "exten", "context", "type"])
            .searchable(&["exten", "context"])
            .default_sort("exten"),
    )
});

pub fn search(conn: &Connection, params: &SearchParameters) -> DaoResult<SearchResult<Extension>> {
    EXTENSION_SEARCH.search(conn, params)
}

pub fn find(conn: &Connection, id: i64) -> DaoResult<Option<Extension>> {
    super::find(conn, id)
}

pub fn get(conn: &Connection, id: i64) -> DaoResult<Extension> {
    super::get(conn, id)
}

pub fn find_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Option<Extension>> {
    criteria::find_by(conn, criteria)
}

pub fn get_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Extension> {
    criteria::get_by(conn, criteria)
}

pub fn find_all_by(conn: &Connection, criteria: &Criteria) -> DaoResult<Vec<Extension>> {
    criteria::find_all_by(conn, criteria)
}

pub fn create(conn: &Connection, extension: &Extension) -> DaoResult<Extension> {
    super::create(conn, extension)
}

/// Lines carrying the extension pick up its new number and context.
pub fn edit(conn: &Connection, extension: &Extension) -> DaoResult<()> {
    with_savepoint(conn, "extension_edit", |conn| {
        record::update(conn, extension)?;
        for line_id in line_ids(conn, extension.id)? {
            LineFixes::new(conn).fix(line_id)?;
        }
        Ok(())
    })
}

pub fn delete(conn: &Connection, extension: &Extension) -> DaoResult<()> {
    with_savepoint(conn, "extension_delete", |conn| {
        let line_ids = line_ids(conn, extension.id)?;
        record::delete(conn, extension)?;
        for line_id in line_ids {
            LineFixes::new(conn).fix(line_id)?;
        }
        Ok(())
    })
}

fn line_ids(conn: &Connection, extension_id: i64) -> DaoResult<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT line_id FROM line_extension WHERE extension_id = ?1 ORDER BY line_id ASC;",
    )?;
    let ids = stmt
        .query_map([extension_id], |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Line;
    use crate::query::search::Direction;
    use crate::resources::line;
    use crate::testing;

    #[test]
    fn test_search_orders_by_exten() {
        let conn = testing::setup_db();
        testing::add_extension(&conn, "1002", "default");
        testing::add_extension(&conn, "1001", "default");
        testing::add_extension(&conn, "2001", "other");

        let params = SearchParameters::new().search("100").direction(Direction::Desc);
        let result = search(&conn, &params).unwrap();

        assert_eq!(result.total, 2);
        let extens: Vec<_> = result.items.iter().map(|e| e.exten.as_str()).collect();
        assert_eq!(extens, ["1002", "1001"]);
    }

    #[test]
    fn test_edit_renumbers_line() {
        let conn = testing::setup_db();
        let l = testing::add_line(&conn, Line::new("default"));
        let mut ext = testing::add_extension(&conn, "1000", "default");
        testing::add_line_extension(&conn, l.id, ext.id);

        ext.exten = "1500".into();
        edit(&conn, &ext).unwrap();

        assert_eq!(line::get(&conn, l.id).unwrap().number.as_deref(), Some("1500"));
    }

    #[test]
    fn test_delete_clears_line_number() {
        let conn = testing::setup_db();
        let l = testing::add_line(&conn, Line::new("default"));
        let ext = testing::add_extension(&conn, "1000", "default");
        testing::add_line_extension(&conn, l.id, ext.id);
        line::edit(&conn, &line::get(&conn, l.id).unwrap()).unwrap();
        assert_eq!(line::get(&conn, l.id).unwrap().number.as_deref(), Some("1000"));

        delete(&conn, &ext).unwrap();

        assert_eq!(line::get(&conn, l.id).unwrap().number, None);
        assert!(find(&conn, ext.id).unwrap().is_none());
    }
}
