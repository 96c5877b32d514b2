use std::collections::BTreeMap;

/// Currency every amount is stored in.
pub const BASE_CURRENCY: &str = "UGX";

/// Exchange rates keyed by currency code. A rate `r` for code `C` means
/// `1 UGX = r C`.
pub type ExchangeRates = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// No exchange rate is configured for the code.
    UnknownCurrency(String),
}

impl std::fmt::Display for CurrencyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrencyError::UnknownCurrency(code) => {
                write!(f, "no exchange rate configured for {code}")
            }
        }
    }
}

impl std::error::Error for CurrencyError {}

fn rate_for(rates: &ExchangeRates, code: &str) -> Result<f64, CurrencyError> {
    rates
        .get(code)
        .copied()
        .ok_or_else(|| CurrencyError::UnknownCurrency(code.to_string()))
}

/// Converts `amount` from one currency to another via the base currency.
pub fn convert(
    amount: f64,
    from: &str,
    to: &str,
    rates: &ExchangeRates,
) -> Result<f64, CurrencyError> {
    if from == to {
        return Ok(amount);
    }
    let in_base = if from == BASE_CURRENCY {
        amount
    } else {
        amount / rate_for(rates, from)?
    };
    if to == BASE_CURRENCY {
        Ok(in_base)
    } else {
        Ok(in_base * rate_for(rates, to)?)
    }
}
