//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod activity_model;
pub mod confirmation_model;
pub mod job_model;
