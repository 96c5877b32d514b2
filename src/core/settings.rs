//! Currency and budget configuration for a session.

use serde::{Deserialize, Serialize};

use super::currency::{self, BASE_CURRENCY, CurrencyError, ExchangeRates};

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// The default currency is neither the base nor has a rate.
    UnknownCurrency(String),
    /// The budget is negative or not a finite number.
    InvalidBudget(f64),
    /// A rate is zero, negative or not finite.
    InvalidRate(String, f64),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::UnknownCurrency(code) => {
                write!(f, "currency {code} has no exchange rate")
            }
            SettingsError::InvalidBudget(v) => {
                write!(f, "monthly budget must be a non-negative number, got {v}")
            }
            SettingsError::InvalidRate(code, v) => {
                write!(f, "exchange rate for {code} must be positive, got {v}")
            }
        }
    }
}

impl std::error::Error for SettingsError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Currency figures are displayed in.
    pub default_currency: String,
    /// Budget in the base currency.
    pub monthly_budget: f64,
    pub exchange_rates: ExchangeRates,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_currency: BASE_CURRENCY.to_string(),
            monthly_budget: 0.0,
            exchange_rates: ExchangeRates::from([
                ("KSH".to_string(), 0.024),
                ("RWF".to_string(), 0.32),
            ]),
        }
    }
}

impl Settings {
    /// Base currency followed by every code with a rate.
    pub fn currencies(&self) -> Vec<&str> {
        let mut out = vec![BASE_CURRENCY];
        out.extend(
            self.exchange_rates
                .keys()
                .map(String::as_str)
                .filter(|c| *c != BASE_CURRENCY),
        );
        out
    }

    pub fn is_known(&self, code: &str) -> bool {
        code == BASE_CURRENCY || self.exchange_rates.contains_key(code)
    }

    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, CurrencyError> {
        currency::convert(amount, from, to, &self.exchange_rates)
    }

    /// Converts a base-currency amount into the default currency.
    pub fn to_display(&self, amount: f64) -> Result<f64, CurrencyError> {
        self.convert(amount, BASE_CURRENCY, &self.default_currency)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for (code, rate) in &self.exchange_rates {
            if !rate.is_finite() || *rate <= 0.0 {
                return Err(SettingsError::InvalidRate(code.clone(), *rate));
            }
        }
        if !self.monthly_budget.is_finite() || self.monthly_budget < 0.0 {
            return Err(SettingsError::InvalidBudget(self.monthly_budget));
        }
        if !self.is_known(&self.default_currency) {
            return Err(SettingsError::UnknownCurrency(
                self.default_currency.clone(),
            ));
        }
        Ok(())
    }
}
