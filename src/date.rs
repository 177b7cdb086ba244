use chrono::{Datelike, NaiveDate};

use crate::consts::{DATE_LAYOUTS, DISPLAY_LAYOUT};

/// Error type for signature-date parsing.
///
/// Both variants are recoverable: callers surface them as an
/// `is_valid = false` result rather than aborting the validation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    /// Input was missing or blank after trimming.
    #[error("No signature date provided")]
    EmptyInput,

    /// No supported layout matched the input.
    #[error("Could not parse signature date: {0}")]
    Unparseable(String),
}

/// Parses a free-form signature date string.
///
/// Trims the input and tries each layout in [`DATE_LAYOUTS`] in order,
/// returning the first successful parse. Two-digit years follow chrono's
/// `%y` convention (00-68 map to 20xx, 69-99 to 19xx).
///
/// # Errors
/// Returns `DateParseError::EmptyInput` for blank input and
/// `DateParseError::Unparseable` when no layout matches.
pub fn parse_flexible_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::EmptyInput);
    }

    for layout in DATE_LAYOUTS {
        let Ok(date) = NaiveDate::parse_from_str(trimmed, layout) else {
            continue;
        };
        // chrono's %Y accepts fewer than four digits; a sub-century hit on a
        // four-digit layout means the input used a two-digit year, which the
        // %y layouts further down handle with the proper century pivot.
        if layout.contains("%Y") && date.year() < 100 {
            continue;
        }
        return Ok(date);
    }

    Err(DateParseError::Unparseable(trimmed.to_owned()))
}

/// Formats a date the way results and rejection reasons display it.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_LAYOUT).to_string()
}
