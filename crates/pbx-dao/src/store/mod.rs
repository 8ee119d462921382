pub mod database;
pub mod record;
pub mod schema;
pub mod session;
