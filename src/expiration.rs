use chrono::{Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::{DAYS_PER_MONTH, MAX_EXPLICIT_MONTHS};
use crate::date::{format_display_date, parse_flexible_date};
use crate::rules::ValidityRuleTable;
use crate::validity::round_tenth;

/// Utilities whose LOAs carry a standing "valid one year from the sign
/// date" clause, overriding the jurisdiction default without any numeric
/// statement appearing in the document text.
const ONE_YEAR_CLAUSE_UTILITIES: [&str; 1] = ["GSECO"];

/// Numeric-expiration phrase family, scanned case-insensitively in this
/// order; the first capture wins. Documents state their own expiration in
/// a handful of recurring shapes ("expires in 6 months", "valid for 24
/// months", "this authorization will expire in 3 months", ...).
static EXPLICIT_EXPIRATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bexpires?\s+(?:in\s+|after\s+)?(\d{1,3})\s+months?\b",
        r"(?i)\bvalid\s+for\s+(\d{1,3})\s+months?\b",
        r"(?i)\bexpires?\s+(\d{1,3})\s+months?\s+(?:from|after)\b",
        r"(?i)\bthis\s+authorization\s+will\s+expire\s+(?:in\s+)?(\d{1,3})\s+months?\b",
        r"(?i)\bloa\s+will\s+expire\s+(?:in\s+)?(\d{1,3})\s+months?\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap_or_else(|e| panic!("invalid expiration pattern: {e}")))
    .collect()
});

/// Outcome of an LOA expiration computation.
///
/// Mirrors [`crate::ValidityResult`]'s recovery contract: a missing or
/// garbled signature date leaves `expiration_date` unset with the message
/// in `expiration_date_formatted`, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationResult {
    pub expiration_date: Option<NaiveDate>,
    /// Display form of the expiration date, or the message explaining why
    /// it could not be computed.
    pub expiration_date_formatted: String,
    /// Remaining months, fixed-divisor convention, rounded to one decimal.
    pub months_until_expiration: Option<f64>,
    pub days_until_expiration: Option<i64>,
    pub expiration_months_used: Option<u32>,
    /// Which rule or override path produced the months used.
    pub rule_used: String,
    pub explicit_expiration_found: bool,
    pub explicit_expiration_months: Option<u32>,
    pub is_expired: bool,
}

impl ExpirationResult {
    fn undetermined(message: String) -> Self {
        Self {
            expiration_date: None,
            expiration_date_formatted: message,
            months_until_expiration: None,
            days_until_expiration: None,
            expiration_months_used: None,
            rule_used: "No rule applied".to_owned(),
            explicit_expiration_found: false,
            explicit_expiration_months: None,
            is_expired: false,
        }
    }
}

/// Scans document text for an explicit numeric expiration statement.
/// Captures of zero or implausibly large month counts are ignored.
fn detect_explicit_expiration(document_text: &str) -> Option<u32> {
    for pattern in EXPLICIT_EXPIRATION_PATTERNS.iter() {
        let Some(captures) = pattern.captures(document_text) else {
            continue;
        };
        let Some(months) = captures.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
            continue;
        };
        if months == 0 || months > MAX_EXPLICIT_MONTHS {
            debug!(months, "ignoring out-of-range explicit expiration capture");
            continue;
        }
        return Some(months);
    }
    None
}

pub(crate) fn loa_expiration(
    table: &ValidityRuleTable,
    raw_date: Option<&str>,
    state: &str,
    utility: Option<&str>,
    document_text: &str,
    today: NaiveDate,
) -> ExpirationResult {
    let raw = raw_date.unwrap_or_default();
    let signature_date = match parse_flexible_date(raw) {
        Ok(date) => date,
        Err(e) => {
            warn!(raw_date = raw, %state, "cannot compute expiration: {e}");
            return ExpirationResult::undetermined(e.to_string());
        }
    };

    let one_year_clause = utility
        .map(|code| code.trim().to_uppercase())
        .is_some_and(|code| ONE_YEAR_CLAUSE_UTILITIES.contains(&code.as_str()));
    let explicit_months = if one_year_clause {
        Some(12)
    } else {
        detect_explicit_expiration(document_text)
    };

    let (months_used, rule_used) = match explicit_months {
        Some(months) => (
            months,
            format!("Explicit statement in document: {months} months"),
        ),
        None => {
            let rule = table.resolve(state, utility);
            (
                rule.period_months(),
                format!("State/Utility rule: {}", rule.label()),
            )
        }
    };

    // Calendar-month add with month-end clamping: Jan 31 + 1 month lands on
    // the last day of February.
    let Some(expiration_date) = signature_date.checked_add_months(Months::new(months_used)) else {
        return ExpirationResult::undetermined(format!(
            "Error calculating expiration date: adding {months_used} months to {} overflows the calendar",
            format_display_date(signature_date),
        ));
    };

    let days_until = expiration_date.signed_duration_since(today).num_days();
    let months_until = days_until as f64 / DAYS_PER_MONTH;

    ExpirationResult {
        expiration_date: Some(expiration_date),
        expiration_date_formatted: format_display_date(expiration_date),
        months_until_expiration: Some(round_tenth(months_until)),
        days_until_expiration: Some(days_until),
        expiration_months_used: Some(months_used),
        rule_used,
        explicit_expiration_found: explicit_months.is_some(),
        explicit_expiration_months: explicit_months,
        is_expired: days_until <= 0,
    }
}
