//! config/mod.rs
//! Configuración del proceso (variables de entorno / .env).

pub mod app_config;
