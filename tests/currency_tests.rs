use spendbook::core::{CurrencyError, Settings};

#[test]
fn same_currency_is_identity() {
    let s = Settings::default();
    for code in s.currencies() {
        for x in [0.0, 1.0, 4.5, 123456.78] {
            assert_eq!(s.convert(x, code, code).unwrap(), x);
        }
    }
}

#[test]
fn there_and_back_again() {
    let s = Settings::default();
    let codes = s.currencies();
    for a in &codes {
        for b in &codes {
            let x = 1234.56;
            let y = s.convert(x, a, b).unwrap();
            let back = s.convert(y, b, a).unwrap();
            assert!((back - x).abs() < 1e-6, "{a} -> {b}");
        }
    }
}

#[test]
fn missing_rate_is_explicit() {
    let s = Settings::default();
    assert_eq!(
        s.convert(1.0, "UGX", "USD"),
        Err(CurrencyError::UnknownCurrency("USD".into()))
    );
}
