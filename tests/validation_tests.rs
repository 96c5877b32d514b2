use spendbook::core::validation::{
    AMOUNT_FORMAT, validate_amount, validate_category, validate_date, validate_description,
};
use spendbook::core::{Field, TransactionInput, validate};

#[test]
fn amount_examples() {
    assert_eq!(validate_amount("007"), vec![AMOUNT_FORMAT]);
    assert!(validate_amount("12.5").is_empty());
    assert_eq!(validate_amount("12.555"), vec![AMOUNT_FORMAT]);
}

#[test]
fn calendar_invalid_day_is_accepted() {
    assert!(validate_date("2024-02-30").is_empty());
}

#[test]
fn valid_candidate_has_no_errors() {
    let input = TransactionInput::new("Morning coffee run", "4.50", "Food", "2024-03-15");
    let report = validate(&input);
    assert!(report.is_valid());
    assert!(validate_description(&input.description).is_empty());
    assert!(validate_category(&input.category).is_empty());
}

#[test]
fn all_fields_are_checked_together() {
    let input = TransactionInput::new("", "", "", "");
    let report = validate(&input);
    for field in [Field::Description, Field::Amount, Field::Date, Field::Category] {
        assert!(!report.messages_for(field).is_empty(), "{field}");
    }
    assert!(report.to_string().contains("amount: Amount is required"));
}
