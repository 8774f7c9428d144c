//! Converter contract tests, including the normalization idempotence
//! property.

use bulkstream::convert::{
    self, ConvertOptions, DEFAULT_DATE_FORMAT, normalize_decimal, normalize_string, to_big_int,
    to_boolean, to_date, to_double, to_int,
};
use chrono::NaiveDate;
use proptest::prelude::*;

#[test]
fn string_normalization_fixtures() {
    let defaults = ConvertOptions::default();
    assert_eq!(
        normalize_string(Some(" foo bar "), &defaults),
        Some("foo bar".to_string())
    );
    assert_eq!(
        normalize_string(Some("\" foo bar \""), &defaults),
        Some("foo bar".to_string())
    );

    let no_trim = ConvertOptions {
        trim: false,
        replace_double_spaces: false,
        ..ConvertOptions::default()
    };
    assert_eq!(
        normalize_string(Some(" foo bar "), &no_trim),
        Some(" foo bar ".to_string())
    );
}

#[test]
fn decimal_disambiguation_fixtures() {
    assert_eq!(
        normalize_decimal(Some("1,000.00"), false),
        Some("1000.00".to_string())
    );
    assert_eq!(
        normalize_decimal(Some("1.000,00"), false),
        Some("1000.00".to_string())
    );
    assert_eq!(
        normalize_decimal(Some("1000,00"), false),
        Some("1000.00".to_string())
    );
    assert_eq!(
        normalize_decimal(Some("6.626e-34"), false),
        Some("6.626e-34".to_string())
    );
}

#[test]
fn integer_fixtures() {
    assert_eq!(to_big_int(Some("1,234,567"), false).unwrap(), Some(1234567));
    assert_eq!(
        to_big_int(Some("(1234567)"), false).unwrap(),
        Some(-1234567)
    );
    assert_eq!(to_big_int(Some(""), false).unwrap(), None);
    assert_eq!(to_big_int(Some(""), true).unwrap(), Some(0));
    // Punctuation on the integer path always reads as grouping.
    assert_eq!(to_int(Some("1.234"), false).unwrap(), Some(1234));
}

#[test]
fn boolean_fixtures() {
    assert_eq!(to_boolean(Some("TRUE")).unwrap(), Some(true));
    assert_eq!(to_boolean(Some("no")).unwrap(), Some(false));
    assert!(to_boolean(Some("maybe")).is_err());
}

#[test]
fn date_fixtures() {
    let expected = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
    assert_eq!(
        to_date(Some("2020-12-31"), DEFAULT_DATE_FORMAT).unwrap(),
        Some(expected)
    );
    assert_eq!(to_date(Some("31122020"), "%d%m%Y").unwrap(), Some(expected));
    assert!(to_date(Some("31122020"), DEFAULT_DATE_FORMAT).is_err());
}

#[test]
fn no_data_marker_reads_as_null() {
    assert_eq!(to_int(Some(convert::NO_DATA_MARKER), false).unwrap(), None);
    assert_eq!(to_double(Some(convert::NO_DATA_MARKER), false).unwrap(), None);
    assert_eq!(
        to_int(Some(convert::NO_DATA_MARKER), true).unwrap(),
        Some(0)
    );
}

proptest! {
    // Quote characters are exercised by the fixture tests above; nested
    // wrapped quotes are intentionally outside the idempotence claim because
    // each pass strips exactly one layer.
    #[test]
    fn normalize_string_is_idempotent(input in "[a-zA-Z0-9 \\t\\n\\r]{0,32}") {
        let defaults = ConvertOptions::default();
        let once = normalize_string(Some(&input), &defaults);
        let twice = normalize_string(once.as_deref(), &defaults);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_decimal_output_has_one_canonical_separator(input in "[0-9]{1,6}[.,][0-9]{1,4}") {
        let normalized = normalize_decimal(Some(&input), false).unwrap();
        prop_assert!(!normalized.contains(','));
        prop_assert!(normalized.matches('.').count() <= 1);
    }
}
