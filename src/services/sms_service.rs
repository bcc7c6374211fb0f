use crate::{
    config::app_config::{ConfigError, TwilioConfig},
    models::{confirmation_model::ChannelFailure, job_model::Job},
    services::twilio_client::TwilioClient,
};

#[derive(Debug, Clone)]
pub struct SmsService {
    twilio: TwilioClient,
    company_name: String,
}

impl SmsService {
    pub fn new(config: &TwilioConfig, company_name: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            twilio: TwilioClient::new(config)?,
            company_name: company_name.to_string(),
        })
    }

    pub async fn attempt(&self, job: &Job, phone: &str) -> Result<String, ChannelFailure> {
        let body = render_sms_text(job, &self.company_name);
        let message_sid = self
            .twilio
            .create("Messages", phone, &[("Body", body.as_str())])
            .await?;
        log::info!("(sms) Mensaje creado para job={} sid={}", job.id, message_sid);
        Ok(message_sid)
    }
}

pub fn render_sms_text(job: &Job, company_name: &str) -> String {
    let mut text = format!(
        "{}: your service is confirmed {}.",
        company_name,
        job.schedule_phrase()
    );
    if let Some(address) = job.service_address.as_deref().filter(|a| !a.trim().is_empty()) {
        text.push_str(&format!(" Address: {}.", address.trim()));
    }
    text.push_str(" Reply or call to reschedule.");
    text
}
