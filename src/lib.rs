//! Catálogo de tours: validação do schema, hooks de consulta e API REST.

pub mod common;
pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod seed;
pub mod services;
