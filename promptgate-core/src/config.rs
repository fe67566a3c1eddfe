use std::collections::HashMap;
use std::time::Duration;

use crate::{CostMeter, PromptgateError, RateCard, Redactor};

/// Timeout and retry knobs for provider calls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResilienceConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 2,
            backoff_base: Duration::from_millis(250),
        }
    }
}

/// Per-provider partial override; unset knobs fall back to the global
/// defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResilienceOverride {
    pub timeout: Option<Duration>,
    pub max_retries: Option<u32>,
    pub backoff_base: Option<Duration>,
}

impl ResilienceOverride {
    fn apply_to(&self, base: ResilienceConfig) -> ResilienceConfig {
        ResilienceConfig {
            timeout: self.timeout.unwrap_or(base.timeout),
            max_retries: self.max_retries.unwrap_or(base.max_retries),
            backoff_base: self.backoff_base.unwrap_or(base.backoff_base),
        }
    }
}

/// Immutable runtime configuration, constructed once at startup and injected
/// into the orchestrator. Nothing in the runtime reads ambient process state.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    resilience: ResilienceConfig,
    provider_overrides: HashMap<String, ResilienceOverride>,
    default_model: String,
    fallback_model: Option<String>,
    dry_run: bool,
    redact_logs: bool,
    default_rate: RateCard,
    model_rates: HashMap<String, RateCard>,
}

impl RuntimeConfig {
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::default()
    }

    pub fn resilience_for(&self, provider: &str) -> ResilienceConfig {
        match self.provider_overrides.get(provider) {
            Some(overrides) => overrides.apply_to(self.resilience),
            None => self.resilience,
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn fallback_model(&self) -> Option<&str> {
        self.fallback_model.as_deref()
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn redact_logs(&self) -> bool {
        self.redact_logs
    }

    pub fn redactor(&self) -> Redactor {
        Redactor::new(self.redact_logs)
    }

    pub fn cost_meter(&self) -> CostMeter {
        self.model_rates
            .iter()
            .fold(CostMeter::new(self.default_rate), |meter, (model, rate)| {
                meter.with_model_rate(model.clone(), *rate)
            })
    }
}

#[derive(Clone, Debug)]
pub struct RuntimeConfigBuilder {
    resilience: ResilienceConfig,
    provider_overrides: HashMap<String, ResilienceOverride>,
    default_model: Option<String>,
    fallback_model: Option<String>,
    dry_run: bool,
    redact_logs: bool,
    default_rate: RateCard,
    model_rates: HashMap<String, RateCard>,
}

impl Default for RuntimeConfigBuilder {
    fn default() -> Self {
        Self {
            resilience: ResilienceConfig::default(),
            provider_overrides: HashMap::new(),
            default_model: None,
            fallback_model: None,
            dry_run: false,
            redact_logs: true,
            default_rate: RateCard {
                cpm_input: 0.005,
                cpm_output: 0.015,
            },
            model_rates: HashMap::new(),
        }
    }
}

impl RuntimeConfigBuilder {
    pub fn default_model(mut self, value: impl Into<String>) -> Self {
        self.default_model = Some(value.into());
        self
    }

    pub fn fallback_model(mut self, value: impl Into<String>) -> Self {
        self.fallback_model = Some(value.into());
        self
    }

    pub fn resilience(mut self, value: ResilienceConfig) -> Self {
        self.resilience = value;
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.resilience.timeout = value;
        self
    }

    pub fn max_retries(mut self, value: u32) -> Self {
        self.resilience.max_retries = value;
        self
    }

    pub fn backoff_base(mut self, value: Duration) -> Self {
        self.resilience.backoff_base = value;
        self
    }

    pub fn provider_override(
        mut self,
        provider: impl Into<String>,
        value: ResilienceOverride,
    ) -> Self {
        self.provider_overrides.insert(provider.into(), value);
        self
    }

    pub fn dry_run(mut self, value: bool) -> Self {
        self.dry_run = value;
        self
    }

    pub fn redact_logs(mut self, value: bool) -> Self {
        self.redact_logs = value;
        self
    }

    pub fn default_rate(mut self, value: RateCard) -> Self {
        self.default_rate = value;
        self
    }

    pub fn model_rate(mut self, model: impl Into<String>, value: RateCard) -> Self {
        self.model_rates.insert(model.into(), value);
        self
    }

    pub fn build(self) -> Result<RuntimeConfig, PromptgateError> {
        let default_model = self
            .default_model
            .ok_or_else(|| PromptgateError::InvalidConfig("default model is required".into()))?;
        if default_model.trim().is_empty() {
            return Err(PromptgateError::InvalidConfig(
                "default model must not be empty".into(),
            ));
        }
        if self.resilience.timeout.is_zero() {
            return Err(PromptgateError::InvalidConfig(
                "timeout must be greater than zero".into(),
            ));
        }
        if self.default_rate.cpm_input < 0.0 || self.default_rate.cpm_output < 0.0 {
            return Err(PromptgateError::InvalidConfig(
                "cost rates must be non-negative".into(),
            ));
        }

        if !self.redact_logs {
            tracing::warn!("log redaction disabled; raw text will reach trace sinks");
        }

        Ok(RuntimeConfig {
            resilience: self.resilience,
            provider_overrides: self.provider_overrides,
            default_model,
            fallback_model: self.fallback_model,
            dry_run: self.dry_run,
            redact_logs: self.redact_logs,
            default_rate: self.default_rate,
            model_rates: self.model_rates,
        })
    }
}
