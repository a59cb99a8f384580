use std::str::FromStr;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct GenerateConfig {
    /// Model id passed to the provider.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Records requested per model.
    pub records_per_model: usize,
    /// How many target records are spelled out per reference field in prompts.
    pub reference_sample_size: usize,
    /// Upper bound for one model's AI call; past it the model falls back.
    pub request_timeout: Duration,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            model: "openai/gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            records_per_model: 5,
            reference_sample_size: 10,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl GenerateConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        Ok(Self {
            model: std::env::var("RECORD_SYNTH_MODEL")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(d.model),
            temperature: env_parse("RECORD_SYNTH_TEMPERATURE", d.temperature)?,
            max_tokens: env_parse("RECORD_SYNTH_MAX_TOKENS", d.max_tokens)?,
            records_per_model: env_parse("RECORD_SYNTH_COUNT", d.records_per_model)?,
            reference_sample_size: env_parse("RECORD_SYNTH_SAMPLE_SIZE", d.reference_sample_size)?,
            request_timeout: Duration::from_secs(env_parse(
                "RECORD_SYNTH_TIMEOUT_SECS",
                d.request_timeout.as_secs(),
            )?),
        })
    }
}

fn env_parse<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_keys_use_defaults() {
        let v: usize = env_parse("RECORD_SYNTH_TEST_UNSET_KEY", 7).unwrap();
        assert_eq!(v, 7);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        std::env::set_var("RECORD_SYNTH_TEST_BAD_NUMBER", "lots");
        let r: Result<u32, _> = env_parse("RECORD_SYNTH_TEST_BAD_NUMBER", 1);
        assert!(matches!(r, Err(ConfigError::Invalid { .. })));
    }
}
