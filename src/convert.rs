//! Field-conversion engine: normalization and strict typed parsing.
//!
//! Raw fields arrive as messy text (mixed locale number formats, stray
//! whitespace and quoting, inconsistent null markers). Each converter here is
//! total over garbage input up to its final strict parse: cleaning never
//! fails, and only the final parse against the target grammar can produce a
//! [`ConvertError`]. That failure is terminal for the whole line; converters
//! never downgrade it to a null value.
//!
//! Three shared stages feed the typed converters:
//!
//! - [`normalize_string`] — trim, quote stripping, whitespace normalization
//! - [`clean_numeric_token`] — locale noise removal before numeric parsing
//! - [`normalize_decimal`] — `.`/`,` decimal-vs-thousands disambiguation

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder token the upstream exports use for absent values.
pub const NO_DATA_MARKER: &str = "нет данных";

/// Escape sequence some dump formats emit for SQL NULL in date fields.
const ESCAPED_NULL: &str = "\\N";

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid {target} token '{value}'")]
    Number { target: &'static str, value: String },
    #[error("{target} value '{value}' is out of range")]
    Range { target: &'static str, value: String },
    #[error("unrecognized boolean token '{value}'")]
    Boolean { value: String },
    #[error("'{value}' does not match date format '{format}'")]
    Date { value: String, format: String },
    #[error("'{value}' does not match datetime format '{format}'")]
    DateTime { value: String, format: String },
    #[error("'{value}' is not a valid time interval")]
    Interval { value: String },
}

/// Per-column converter options. String-path flags default to the aggressive
/// cleanup the upstream exports need; numeric and pattern options default off.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    pub trim: bool,
    pub trim_quotes: bool,
    pub replace_special_chars: bool,
    pub replace_double_spaces: bool,
    pub upper_case: bool,
    pub empty_as_null: bool,
    pub zero_for_null: bool,
    /// Strict chrono pattern for Date/DateTime columns. Exactly one pattern
    /// applies per column; there are no fallback formats.
    pub format: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            trim: true,
            trim_quotes: true,
            replace_special_chars: true,
            replace_double_spaces: true,
            upper_case: false,
            empty_as_null: true,
            zero_for_null: false,
            format: None,
        }
    }
}

/// Normalizes a raw string field. Total; never fails.
///
/// Pass order matters: trim, quote stripping (one layer, then re-trim),
/// whitespace-to-space mapping, space-run collapsing, and upper-casing last.
/// Emptiness is re-checked after each stage that can produce it.
pub fn normalize_string(value: Option<&str>, opts: &ConvertOptions) -> Option<String> {
    let on_empty = || {
        if opts.empty_as_null {
            None
        } else {
            Some(String::new())
        }
    };
    let Some(raw) = value else {
        return on_empty();
    };
    let mut value = if opts.trim { raw.trim() } else { raw }.to_string();
    if value.is_empty() {
        return on_empty();
    }
    if opts.trim_quotes && value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value = value[1..value.len() - 1].to_string();
        if opts.trim {
            value = value.trim().to_string();
        }
        if value.is_empty() {
            return on_empty();
        }
    }
    if opts.replace_special_chars {
        value = value
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect();
    }
    if opts.replace_double_spaces {
        let mut collapsed = String::with_capacity(value.len());
        let mut prev_space = false;
        for c in value.chars() {
            if c == ' ' && prev_space {
                continue;
            }
            prev_space = c == ' ';
            collapsed.push(c);
        }
        value = collapsed;
    }
    if value.is_empty() {
        return on_empty();
    }
    if opts.upper_case {
        value = value.to_uppercase();
    }
    Some(value)
}

/// Strips locale noise from a numeric token ahead of the strict parse.
///
/// Null, empty-after-trim, and the no-data marker map to `None` (or `"0"`
/// under `zero_for_null`). The literal zero tokens `-`, `()`, and `.` map to
/// `"0"` unconditionally. Internal spaces (thousands-by-space) are removed.
/// Integer-family callers set `drop_punctuation` to remove every `.` and `,`
/// wholesale; parentheses survive so the final parse can read them as a
/// negative sign.
pub fn clean_numeric_token(
    value: Option<&str>,
    zero_for_null: bool,
    drop_punctuation: bool,
) -> Option<String> {
    let on_null = || zero_for_null.then(|| "0".to_string());
    let Some(raw) = value else {
        return on_null();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NO_DATA_MARKER {
        return on_null();
    }
    if matches!(trimmed, "-" | "()" | ".") {
        return Some("0".to_string());
    }
    let mut token: String = trimmed.chars().filter(|c| *c != ' ').collect();
    if drop_punctuation {
        token.retain(|c| c != '.' && c != ',');
    }
    Some(token)
}

/// Resolves which of `.`/`,` is the decimal separator and produces a
/// canonical decimal string (separator `.`, no grouping).
///
/// The resolution is order-sensitive: when both separators are present the
/// one appearing later is the decimal separator and the earlier one is
/// grouping noise; a lone `,` acts as the decimal separator. Scientific
/// notation passes through untouched.
pub fn normalize_decimal(value: Option<&str>, zero_for_null: bool) -> Option<String> {
    let mut token = clean_numeric_token(value, zero_for_null, false)?;
    if token == "," {
        return Some("0".to_string());
    }
    if token.contains(['e', 'E']) {
        return Some(token);
    }
    token = token.replace("..", ".");
    match (token.find(','), token.find('.')) {
        (Some(comma), Some(dot)) if dot > comma => {
            // 1,000.00
            token.retain(|c| c != ',');
        }
        (Some(_), Some(_)) => {
            // 1.000,00
            token.retain(|c| c != '.');
            token = token.replace(',', ".");
        }
        (Some(_), None) => {
            // 1000,00
            token = token.replace(',', ".");
        }
        _ => {}
    }
    if token.starts_with('.') {
        token.insert(0, '0');
    }
    Some(token)
}

/// Splits a leading/trailing sign or a parenthesized-negative wrapper off a
/// cleaned token, returning (negative, core).
fn split_sign(token: &str) -> (bool, &str) {
    if let Some(inner) = token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        return (true, inner);
    }
    if let Some(rest) = token.strip_prefix('-') {
        return (true, rest);
    }
    if let Some(rest) = token.strip_prefix('+') {
        return (false, rest);
    }
    if let Some(rest) = token.strip_suffix('-') {
        return (true, rest);
    }
    if let Some(rest) = token.strip_suffix('+') {
        return (false, rest);
    }
    (false, token)
}

fn parse_integer(token: &str, target: &'static str) -> Result<i128, ConvertError> {
    let (negative, core) = split_sign(token);
    if core.is_empty() || !core.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConvertError::Number {
            target,
            value: token.to_string(),
        });
    }
    let magnitude: i128 = core.parse().map_err(|_| ConvertError::Number {
        target,
        value: token.to_string(),
    })?;
    Ok(if negative { -magnitude } else { magnitude })
}

macro_rules! integer_converter {
    ($name:ident, $ty:ty, $target:literal) => {
        pub fn $name(
            value: Option<&str>,
            zero_for_null: bool,
        ) -> Result<Option<$ty>, ConvertError> {
            let Some(token) = clean_numeric_token(value, zero_for_null, true) else {
                return Ok(None);
            };
            let parsed = parse_integer(&token, $target)?;
            <$ty>::try_from(parsed)
                .map(Some)
                .map_err(|_| ConvertError::Range {
                    target: $target,
                    value: token,
                })
        }
    };
}

integer_converter!(to_byte, u8, "Byte");
integer_converter!(to_small_int, i16, "SmallInt");
integer_converter!(to_int, i32, "Int");
integer_converter!(to_big_int, i64, "BigInt");

fn parse_float(token: &str, target: &'static str) -> Result<f64, ConvertError> {
    let (negative, core) = split_sign(token);
    let well_formed = !core.is_empty()
        && core
            .chars()
            .all(|c| !c.is_ascii_alphabetic() || matches!(c, 'e' | 'E'));
    if !well_formed {
        return Err(ConvertError::Number {
            target,
            value: token.to_string(),
        });
    }
    let parsed: f64 = core.parse().map_err(|_| ConvertError::Number {
        target,
        value: token.to_string(),
    })?;
    Ok(if negative { -parsed } else { parsed })
}

pub fn to_real(value: Option<&str>, zero_for_null: bool) -> Result<Option<f32>, ConvertError> {
    let Some(token) = normalize_decimal(value, zero_for_null) else {
        return Ok(None);
    };
    parse_float(&token, "Real").map(|v| Some(v as f32))
}

pub fn to_double(value: Option<&str>, zero_for_null: bool) -> Result<Option<f64>, ConvertError> {
    let Some(token) = normalize_decimal(value, zero_for_null) else {
        return Ok(None);
    };
    parse_float(&token, "Double").map(Some)
}

pub fn to_decimal(
    value: Option<&str>,
    zero_for_null: bool,
) -> Result<Option<Decimal>, ConvertError> {
    let Some(token) = normalize_decimal(value, zero_for_null) else {
        return Ok(None);
    };
    let (negative, core) = split_sign(&token);
    let parsed = if core.contains(['e', 'E']) {
        Decimal::from_scientific(core)
    } else {
        core.parse::<Decimal>()
    }
    .map_err(|_| ConvertError::Number {
        target: "Decimal",
        value: token.clone(),
    })?;
    Ok(Some(if negative { -parsed } else { parsed }))
}

pub fn to_boolean(value: Option<&str>) -> Result<Option<bool>, ConvertError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "1" | "-1" | "t" | "true" | "yes" => Ok(Some(true)),
        "0" | "f" | "false" | "no" => Ok(Some(false)),
        _ => Err(ConvertError::Boolean {
            value: trimmed.to_string(),
        }),
    }
}

/// Shared null handling for the pattern-parsed types: null, empty-after-trim,
/// and the exact `\N` escape all mean absent. The escape is matched before
/// trimming, so a padded `" \N "` falls through to the parser and fails there.
fn pattern_input(value: Option<&str>) -> Option<String> {
    let raw = value?;
    if raw == ESCAPED_NULL {
        return None;
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn to_date(value: Option<&str>, format: &str) -> Result<Option<NaiveDate>, ConvertError> {
    let Some(token) = pattern_input(value) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&token, format)
        .map(Some)
        .map_err(|_| ConvertError::Date {
            value: token,
            format: format.to_string(),
        })
}

pub fn to_datetime(
    value: Option<&str>,
    format: &str,
) -> Result<Option<NaiveDateTime>, ConvertError> {
    let Some(token) = pattern_input(value) else {
        return Ok(None);
    };
    NaiveDateTime::parse_from_str(&token, format)
        .map(Some)
        .map_err(|_| ConvertError::DateTime {
            value: token,
            format: format.to_string(),
        })
}

/// Parses the general short interval form `[-]h:mm[:ss[.frac]]`.
///
/// Hours are unbounded; minutes and seconds are strict two-digit fields in
/// `00..=59`. Fractional seconds are read to millisecond precision.
pub fn to_interval(value: Option<&str>) -> Result<Option<TimeDelta>, ConvertError> {
    let Some(token) = pattern_input(value) else {
        return Ok(None);
    };
    parse_interval(&token)
        .map(Some)
        .ok_or_else(|| ConvertError::Interval { value: token })
}

fn parse_interval(token: &str) -> Option<TimeDelta> {
    let (negative, core) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let mut parts = core.split(':');
    let hours = parts.next()?;
    let minutes = parts.next()?;
    let seconds = parts.next();
    if parts.next().is_some() {
        return None;
    }

    if hours.is_empty() || !hours.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i64 = hours.parse().ok()?;
    let minutes = parse_two_digit(minutes)?;
    let (seconds, millis) = match seconds {
        None => (0, 0),
        Some(field) => {
            let (whole, frac) = match field.split_once('.') {
                Some((whole, frac)) => (whole, Some(frac)),
                None => (field, None),
            };
            let whole = parse_two_digit(whole)?;
            let millis = match frac {
                None => 0,
                Some(frac) => parse_millis(frac)?,
            };
            (whole, millis)
        }
    };

    let total_seconds = hours
        .checked_mul(3600)?
        .checked_add(minutes * 60)?
        .checked_add(seconds)?;
    let delta =
        TimeDelta::try_seconds(total_seconds)?.checked_add(&TimeDelta::try_milliseconds(millis)?)?;
    Some(if negative { -delta } else { delta })
}

fn parse_two_digit(field: &str) -> Option<i64> {
    if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let parsed: i64 = field.parse().ok()?;
    (parsed < 60).then_some(parsed)
}

fn parse_millis(frac: &str) -> Option<i64> {
    if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut padded = frac.to_string();
    padded.truncate(3);
    while padded.len() < 3 {
        padded.push('0');
    }
    padded.parse().ok()
}
