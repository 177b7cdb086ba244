mod consts;
mod date;
mod expiration;
mod prelude;
mod rules;
mod validity;

pub use consts::{DATE_LAYOUTS, DAYS_PER_MONTH, DAYS_PER_YEAR, DISPLAY_LAYOUT, MAX_EXPLICIT_MONTHS};
pub use date::{DateParseError, format_display_date, parse_flexible_date};
pub use expiration::ExpirationResult;
pub use rules::{Region, RuleError, StateRules, ValidityRule, ValidityRuleTable};
pub use validity::ValidityResult;

use chrono::{Local, NaiveDate};

/// Signature-date validity and expiration engine for one jurisdiction
/// region.
///
/// Binds a [`Region`] to its process-wide rule table once at construction;
/// every check after that is pure computation over the call's inputs. The
/// two entry points never fail: malformed input degrades to a result
/// carrying `is_valid = false` or an unset expiration date, so the calling
/// decision layer can keep processing the document's remaining checks.
#[derive(Debug, Clone, Copy)]
pub struct ValidityEngine {
    region: Region,
    rules: &'static ValidityRuleTable,
}

impl ValidityEngine {
    /// Creates an engine for the given region.
    pub fn new(region: Region) -> Self {
        Self {
            region,
            rules: region.rules(),
        }
    }

    /// Returns the region this engine was built for.
    pub const fn region(&self) -> Region {
        self.region
    }

    /// Returns the rule table this engine resolves against.
    pub const fn rules(&self) -> &'static ValidityRuleTable {
        self.rules
    }

    /// Checks whether a signature dated `raw_date` is still within its
    /// regulatory validity window as of `today`.
    ///
    /// `state` is a 2-letter postal code and `utility` an optional UDC
    /// ticker, both matched case-insensitively against the rule table.
    pub fn signature_validity(
        &self,
        raw_date: Option<&str>,
        state: &str,
        utility: Option<&str>,
        today: NaiveDate,
    ) -> ValidityResult {
        validity::signature_validity(self.rules, raw_date, state, utility, today)
    }

    /// [`Self::signature_validity`] against the system clock.
    pub fn signature_validity_now(
        &self,
        raw_date: Option<&str>,
        state: &str,
        utility: Option<&str>,
    ) -> ValidityResult {
        self.signature_validity(raw_date, state, utility, Local::now().date_naive())
    }

    /// Computes the authoritative expiration date of an authorization
    /// signed on `raw_date`, preferring an explicit expiration statement
    /// found in `document_text` over the jurisdiction default.
    pub fn loa_expiration(
        &self,
        raw_date: Option<&str>,
        state: &str,
        utility: Option<&str>,
        document_text: &str,
        today: NaiveDate,
    ) -> ExpirationResult {
        expiration::loa_expiration(self.rules, raw_date, state, utility, document_text, today)
    }

    /// [`Self::loa_expiration`] against the system clock.
    pub fn loa_expiration_now(
        &self,
        raw_date: Option<&str>,
        state: &str,
        utility: Option<&str>,
        document_text: &str,
    ) -> ExpirationResult {
        self.loa_expiration(
            raw_date,
            state,
            utility,
            document_text,
            Local::now().date_naive(),
        )
    }
}
