//! services/email_service.rs

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
        Error as SmtpError,
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    config::app_config::{ConfigError, SmtpConfig},
    models::{
        confirmation_model::{ChannelErrorKind, ChannelFailure},
        job_model::Job,
    },
};

/// Correo de confirmación vía SMTP. El transporte se arma una sola vez.
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    company_name: String,
}

impl EmailService {
    pub fn new(config: &SmtpConfig, company_name: &str) -> Result<Self, ConfigError> {
        let host = config.host.clone().ok_or(ConfigError::Missing("SMTP_HOST"))?;
        let user = config.user.clone().ok_or(ConfigError::Missing("SMTP_USER"))?;
        let pass = config.pass.clone().ok_or(ConfigError::Missing("SMTP_PASS"))?;
        // Si no hay remitente explícito se usa el usuario SMTP
        let from_address = config.from_address.clone().unwrap_or_else(|| user.clone());

        let from = format!("{} <{}>", config.from_name, from_address)
            .parse::<Mailbox>()
            .map_err(|e| ConfigError::Invalid {
                key: "SMTP_FROM_ADDRESS",
                message: e.to_string(),
            })?;

        let tls_params = TlsParameters::new(host.clone()).map_err(|e| ConfigError::Invalid {
            key: "SMTP_HOST",
            message: e.to_string(),
        })?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .map_err(|e| ConfigError::Invalid {
                key: "SMTP_HOST",
                message: e.to_string(),
            })?
            .port(config.port)
            .credentials(Credentials::new(user, pass))
            .tls(Tls::Required(tls_params))
            .build();

        Ok(Self {
            mailer,
            from,
            company_name: company_name.to_string(),
        })
    }

    pub async fn attempt(&self, job: &Job, email: &str) -> Result<String, ChannelFailure> {
        let to = email.parse::<Mailbox>().map_err(|e| {
            ChannelFailure::invalid_destination(format!("invalid address '{email}': {e}"))
        })?;

        let (subject, html) = render_email(job, &self.company_name);
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| ChannelFailure::provider(format!("could not build message: {e}")))?;

        log::info!("(email) Enviando confirmación job={} to={}", job.id, email);
        let response = self.mailer.send(message).await.map_err(map_smtp_error)?;

        let reference = match response.message().next() {
            Some(line) => format!("{} {}", response.code(), line),
            None => response.code().to_string(),
        };
        Ok(reference)
    }
}

/// (subject, html)
pub fn render_email(job: &Job, company_name: &str) -> (String, String) {
    let subject = format!("{} - service confirmation for {}", company_name, job.scheduled_date);

    let mut html = format!(
        "<p>Hello {},</p>\
         <p>This email confirms your scheduled service {}.</p>",
        job.customer_name,
        job.schedule_phrase()
    );
    if let Some(address) = job.service_address.as_deref().filter(|a| !a.trim().is_empty()) {
        html.push_str(&format!("<p>Service address: {}</p>", address.trim()));
    }
    html.push_str(&format!(
        "<p>Job reference: {}</p><p>If you need to reschedule, just reply to this email.</p><p>{}</p>",
        job.id, company_name
    ));
    (subject, html)
}

pub(crate) fn map_smtp_error(error: SmtpError) -> ChannelFailure {
    let code = error.status().map(|c| c.to_string());
    let kind = smtp_error_kind(code.as_deref(), error.is_timeout(), error.is_permanent());
    ChannelFailure::new(kind, error.to_string())
}

/// Código SMTP (si hubo respuesta) -> tipo de falla. Las respuestas
/// transitorias (4xx) quedan como error del proveedor.
pub(crate) fn smtp_error_kind(
    code: Option<&str>,
    is_timeout: bool,
    is_permanent: bool,
) -> ChannelErrorKind {
    match code {
        Some("530") | Some("535") => ChannelErrorKind::AuthFailure,
        _ if is_timeout => ChannelErrorKind::ChannelTimeout,
        _ if is_permanent => ChannelErrorKind::InvalidDestination,
        _ => ChannelErrorKind::ChannelProviderError,
    }
}
