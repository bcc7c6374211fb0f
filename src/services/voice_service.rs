use crate::{
    config::app_config::{ConfigError, TwilioConfig},
    models::{confirmation_model::ChannelFailure, job_model::Job},
    services::twilio_client::TwilioClient,
};

/// Llamada de voz con Twilio (TwiML <Say>).
#[derive(Debug, Clone)]
pub struct VoiceService {
    twilio: TwilioClient,
    company_name: String,
}

impl VoiceService {
    pub fn new(config: &TwilioConfig, company_name: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            twilio: TwilioClient::new(config)?,
            company_name: company_name.to_string(),
        })
    }

    pub async fn attempt(&self, job: &Job, phone: &str) -> Result<String, ChannelFailure> {
        let twiml = render_twiml(&render_voice_script(job, &self.company_name));
        let call_sid = self
            .twilio
            .create("Calls", phone, &[("Twiml", twiml.as_str())])
            .await?;
        log::info!("(voice) Llamada creada para job={} sid={}", job.id, call_sid);
        Ok(call_sid)
    }
}

pub fn render_voice_script(job: &Job, company_name: &str) -> String {
    format!(
        "Hello {}. This is {} calling to confirm your scheduled service {}. \
         Our crew will arrive as planned. If you need to reschedule, please call us back. Thank you.",
        job.customer_name,
        company_name,
        job.schedule_phrase()
    )
}

pub fn render_twiml(script: &str) -> String {
    format!(
        "<Response><Say voice=\"alice\">{}</Say></Response>",
        escape_xml(script)
    )
}

fn escape_xml(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
