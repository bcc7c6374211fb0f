//! handlers/mod.rs
pub mod confirmation_handler;
