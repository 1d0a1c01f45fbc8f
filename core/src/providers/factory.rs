use crate::config::{Config, resolve_api_key};
use crate::error::ConfigError;
use crate::providers::OpenAIProvider;
use crate::traits::Provider;
use std::sync::Arc;

/// Builds the model client from config. Fails early when the API key is missing.
pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>, ConfigError> {
    let api_key = resolve_api_key()?;
    Ok(Arc::new(build_openai(config, api_key)))
}

fn build_openai(config: &Config, api_key: String) -> OpenAIProvider {
    OpenAIProvider::with_timeout(api_key, config.timeouts.model())
        .with_model(config.model.clone())
        .with_base_url(config.base_url.clone())
        .with_temperature(config.temperature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_uses_configured_model() {
        let config = Config {
            model: "gpt-4o-mini".into(),
            ..Default::default()
        };
        let provider = build_openai(&config, "sk-test".into());
        assert_eq!(provider.model(), "gpt-4o-mini");
        assert_eq!(provider.name(), "openai");
    }
}
