use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// USD per thousand tokens, input and output priced separately.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct RateCard {
    pub cpm_input: f64,
    pub cpm_output: f64,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct CostBreakdown {
    pub input_cost_usd: f64,
    pub output_cost_usd: f64,
    pub total_cost_usd: f64,
}

/// Computes per-call cost from token counts. Model-specific rates take
/// precedence over the workspace-level default rate.
#[derive(Clone, Debug)]
pub struct CostMeter {
    default_rate: RateCard,
    model_rates: HashMap<String, RateCard>,
}

impl CostMeter {
    pub fn new(default_rate: RateCard) -> Self {
        Self {
            default_rate,
            model_rates: HashMap::new(),
        }
    }

    pub fn with_model_rate(mut self, model: impl Into<String>, rate: RateCard) -> Self {
        self.model_rates.insert(model.into(), rate);
        self
    }

    pub fn rate_for(&self, model: &str) -> RateCard {
        self.model_rates
            .get(model)
            .copied()
            .unwrap_or(self.default_rate)
    }

    pub fn cost(&self, model: &str, input_tokens: u32, output_tokens: u32) -> CostBreakdown {
        Self::cost_at(self.rate_for(model), input_tokens, output_tokens)
    }

    /// Costs a call at an explicit rate, bypassing the model table.
    pub fn cost_at(rate: RateCard, input_tokens: u32, output_tokens: u32) -> CostBreakdown {
        let input_cost_usd = f64::from(input_tokens) / 1000.0 * rate.cpm_input;
        let output_cost_usd = f64::from(output_tokens) / 1000.0 * rate.cpm_output;
        CostBreakdown {
            input_cost_usd,
            output_cost_usd,
            total_cost_usd: input_cost_usd + output_cost_usd,
        }
    }
}
