//! services/channel_adapter.rs
//! Conjunto cerrado de adaptadores de canal y el registro que los resuelve
//! al arrancar.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    config::app_config::{AppConfig, ConfigError},
    models::{
        confirmation_model::{ChannelFailure, ConfirmationChannel},
        job_model::Job,
    },
    services::{email_service::EmailService, sms_service::SmsService, voice_service::VoiceService},
};

pub enum ChannelAdapter {
    Voice(VoiceService),
    Email(EmailService),
    Sms(SmsService),
    #[cfg(test)]
    Scripted(crate::tests::support::ScriptedAdapter),
}

impl ChannelAdapter {
    pub fn channel(&self) -> ConfirmationChannel {
        match self {
            ChannelAdapter::Voice(_) => ConfirmationChannel::Voice,
            ChannelAdapter::Email(_) => ConfirmationChannel::Email,
            ChannelAdapter::Sms(_) => ConfirmationChannel::Sms,
            #[cfg(test)]
            ChannelAdapter::Scripted(fake) => fake.channel,
        }
    }

    /// Intenta el canal. Devuelve la referencia del proveedor o la falla
    /// como dato; nunca se llama sin destino.
    pub async fn attempt(&self, job: &Job, target: &str) -> Result<String, ChannelFailure> {
        match self {
            ChannelAdapter::Voice(voice) => voice.attempt(job, target).await,
            ChannelAdapter::Email(email) => email.attempt(job, target).await,
            ChannelAdapter::Sms(sms) => sms.attempt(job, target).await,
            #[cfg(test)]
            ChannelAdapter::Scripted(fake) => fake.attempt(job, target).await,
        }
    }
}

/// Canal -> adaptador. Un canal ausente está deshabilitado para todo el proceso.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    adapters: BTreeMap<ConfirmationChannel, Arc<ChannelAdapter>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye los adaptadores disponibles. Un error de configuración
    /// deshabilita solo ese canal.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut registry = ChannelRegistry::new();
        let company = config.company_name.as_str();

        registry.register_or_disable(
            ConfirmationChannel::Voice,
            VoiceService::new(&config.twilio, company).map(ChannelAdapter::Voice),
        );
        registry.register_or_disable(
            ConfirmationChannel::Email,
            EmailService::new(&config.smtp, company).map(ChannelAdapter::Email),
        );
        registry.register_or_disable(
            ConfirmationChannel::Sms,
            SmsService::new(&config.twilio, company).map(ChannelAdapter::Sms),
        );

        log::info!(
            "(channels) Canales habilitados: {:?}",
            registry.enabled().collect::<Vec<_>>()
        );
        registry
    }

    fn register_or_disable(
        &mut self,
        channel: ConfirmationChannel,
        built: Result<ChannelAdapter, ConfigError>,
    ) {
        match built {
            Ok(adapter) => {
                self.register(adapter);
            }
            Err(e) => log::warn!("(channels) Canal '{}' deshabilitado: {}", channel, e),
        }
    }

    /// Reemplaza cualquier adaptador previo del mismo canal.
    pub fn register(&mut self, adapter: ChannelAdapter) -> &mut Self {
        self.adapters.insert(adapter.channel(), Arc::new(adapter));
        self
    }

    pub fn get(&self, channel: ConfirmationChannel) -> Option<&Arc<ChannelAdapter>> {
        self.adapters.get(&channel)
    }

    /// En orden de canal (voice, email, sms).
    pub fn enabled(&self) -> impl Iterator<Item = ConfirmationChannel> + '_ {
        self.adapters.keys().copied()
    }
}
