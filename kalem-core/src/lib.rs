// src/lib.rs

pub mod db;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod test_utils;

pub use db::Database;
pub use kalem_common::error::Error;
