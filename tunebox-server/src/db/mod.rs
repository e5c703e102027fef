//! Store access for tunebox-server
//!
//! Thin async CRUD over the two relations created by
//! `tunebox_common::db::init_database`. One function = one statement, so each
//! mutation is a single atomic unit in SQLite.

pub mod songs;
pub mod users;
