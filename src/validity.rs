use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{DAYS_PER_MONTH, DAYS_PER_YEAR};
use crate::date::{format_display_date, parse_flexible_date};
use crate::rules::ValidityRuleTable;

/// Outcome of a signature-date validity check.
///
/// Every failure mode is represented here rather than as an error: a
/// missing or garbled date yields `is_valid = false` with the numeric
/// fields unset, so the decision layer can always branch on the boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidityResult {
    pub is_valid: bool,
    /// States whether the signature is within or exceeds the limit and by
    /// how much, or why the check could not be performed.
    pub reason: String,
    pub days_old: Option<i64>,
    /// Elapsed months, fixed-divisor convention, rounded to one decimal.
    pub months_old: Option<f64>,
    /// Elapsed years, fixed-divisor convention, rounded to one decimal.
    pub years_old: Option<f64>,
    pub state_limit_months: Option<u32>,
    pub signature_date: Option<String>,
    pub today_date: Option<String>,
}

impl ValidityResult {
    fn rejected(reason: String) -> Self {
        Self {
            is_valid: false,
            reason,
            days_old: None,
            months_old: None,
            years_old: None,
            state_limit_months: None,
            signature_date: None,
            today_date: None,
        }
    }
}

/// Rounds to one decimal place for reporting. The validity comparison
/// itself always uses the unrounded value.
pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn signature_validity(
    table: &ValidityRuleTable,
    raw_date: Option<&str>,
    state: &str,
    utility: Option<&str>,
    today: NaiveDate,
) -> ValidityResult {
    let raw = raw_date.unwrap_or_default();
    let signature_date = match parse_flexible_date(raw) {
        Ok(date) => date,
        Err(e) => {
            warn!(raw_date = raw, %state, "cannot assess signature validity: {e}");
            return ValidityResult::rejected(e.to_string());
        }
    };

    let days_old = today.signed_duration_since(signature_date).num_days();
    let months_old = days_old as f64 / DAYS_PER_MONTH;
    let years_old = days_old as f64 / DAYS_PER_YEAR;

    let rule = table.resolve(state, utility);
    let limit = rule.period_months();
    let is_valid = months_old <= f64::from(limit);

    let comparison = if is_valid { "within" } else { "exceeds" };
    let reason = format!(
        "Signature is {months_old:.1} months old, {comparison} {} {limit}-month limit",
        rule.label(),
    );

    ValidityResult {
        is_valid,
        reason,
        days_old: Some(days_old),
        months_old: Some(round_tenth(months_old)),
        years_old: Some(round_tenth(years_old)),
        state_limit_months: Some(limit),
        signature_date: Some(format_display_date(signature_date)),
        today_date: Some(format_display_date(today)),
    }
}
