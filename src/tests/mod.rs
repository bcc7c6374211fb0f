//! tests/mod.rs
//! Pruebas del despacho de confirmaciones.

pub mod support;

mod activity_tests;
mod handler_tests;
