//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod activity_service;
pub mod channel_adapter;
pub mod confirmation_service;
pub mod detached_task;
pub mod email_service;
pub mod job_service;
pub mod sms_service;
pub mod twilio_client;
pub mod voice_service;
