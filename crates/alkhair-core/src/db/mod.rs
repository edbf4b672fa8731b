//! Database layer for Al-Khair

mod connection;
mod cursor_repository;
mod migrations;

pub use connection::Database;
pub use cursor_repository::{CursorRepository, LibSqlCursorRepository};
