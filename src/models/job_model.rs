//! models/job_model.rs
//! Trabajo agendado (demolición / acarreo) tal como lo guarda el intake.

use serde::{Deserialize, Serialize};

use crate::models::confirmation_model::ConfirmationChannel;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub service_address: Option<String>,
    pub scheduled_date: String, // "YYYY-MM-DD"
    pub time_window: Option<String>, // "8am-10am", etc.
    pub status: String,
}

impl Job {
    pub fn phone(&self) -> Option<&str> {
        non_blank(self.phone.as_deref())
    }

    pub fn email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    /// Destino de contacto para un canal; `None` si el trabajo no tiene
    /// el dato (el canal se omite, no se intenta).
    pub fn contact_target(&self, channel: ConfirmationChannel) -> Option<&str> {
        match channel {
            ConfirmationChannel::Voice | ConfirmationChannel::Sms => self.phone(),
            ConfirmationChannel::Email => self.email(),
        }
    }

    /// Ej: "on 2026-10-20 between 8am-10am"
    pub fn schedule_phrase(&self) -> String {
        match self.time_window.as_deref().map(str::trim) {
            Some(window) if !window.is_empty() => {
                format!("on {} between {}", self.scheduled_date, window)
            }
            _ => format!("on {}", self.scheduled_date),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
