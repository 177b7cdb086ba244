use std::collections::HashMap;
use std::num::NonZeroU32;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prelude::*;

/// Error type for rule-table and region construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// A validity period of zero months is meaningless.
    #[error("Validity period must be at least one month: {label}")]
    ZeroPeriod { label: String },

    /// Region label did not match any known region alias.
    #[error("Unknown region: {0}")]
    UnknownRegion(String),
}

/// Number of months a signature remains valid for one jurisdiction/utility
/// combination, plus a human-readable label used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityRule {
    period_months: NonZeroU32,
    label: String,
}

impl ValidityRule {
    /// Creates a new rule, validating that the period is non-zero.
    ///
    /// # Errors
    /// Returns `RuleError::ZeroPeriod` if `months` is 0.
    pub fn new(months: u32, label: impl Into<String>) -> Result<Self, RuleError> {
        let label = label.into();
        let period_months = NonZeroU32::new(months).ok_or(RuleError::ZeroPeriod {
            label: label.clone(),
        })?;
        Ok(Self {
            period_months,
            label,
        })
    }

    /// Returns the validity period in months.
    #[inline]
    pub const fn period_months(&self) -> u32 {
        self.period_months.get()
    }

    /// Returns the diagnostic label, e.g. "Ohio (1 year)".
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Validity rules for one state: a required default plus optional
/// utility-specific overrides keyed by normalized (uppercase) UDC code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRules {
    default: ValidityRule,
    utilities: HashMap<String, ValidityRule>,
}

impl StateRules {
    /// Creates a state entry with only a default rule.
    pub fn new(default: ValidityRule) -> Self {
        Self {
            default,
            utilities: HashMap::new(),
        }
    }

    /// Adds a utility-specific override. The code is normalized to uppercase.
    pub fn with_utility(mut self, code: &str, rule: ValidityRule) -> Self {
        self.utilities.insert(code.trim().to_uppercase(), rule);
        self
    }

    /// Returns the state default rule.
    pub const fn default_rule(&self) -> &ValidityRule {
        &self.default
    }

    fn utility(&self, code: &str) -> Option<&ValidityRule> {
        self.utilities.get(code)
    }
}

/// Two-level mapping from state (and optionally utility) to validity rule,
/// with a region-level default as the final fallback. Immutable, read-only
/// configuration: the two production instances are built once per process
/// and shared by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityRuleTable {
    states: HashMap<String, StateRules>,
    default: ValidityRule,
}

impl ValidityRuleTable {
    /// Creates an empty table with the given region-level default.
    pub fn new(default: ValidityRule) -> Self {
        Self {
            states: HashMap::new(),
            default,
        }
    }

    /// Adds a state entry. The state code is normalized to uppercase.
    pub fn with_state(mut self, state: &str, rules: StateRules) -> Self {
        self.states.insert(state.trim().to_uppercase(), rules);
        self
    }

    /// Returns the region-level default rule.
    pub const fn default_rule(&self) -> &ValidityRule {
        &self.default
    }

    /// Resolves the applicable rule for a state and optional utility code.
    ///
    /// State and utility are matched case-insensitively and only by exact
    /// equality after normalization. A utility-specific rule always wins
    /// over the state default; an unrecognized state falls back to the
    /// region default. This lookup is total.
    pub fn resolve(&self, state: &str, utility: Option<&str>) -> &ValidityRule {
        let state_key = state.trim().to_uppercase();
        let Some(state_rules) = self.states.get(&state_key) else {
            debug!(state = %state_key, "state not in rule table, using region default");
            return &self.default;
        };

        if let Some(code) = utility {
            let code_key = code.trim().to_uppercase();
            if let Some(rule) = state_rules.utility(&code_key) {
                debug!(state = %state_key, utility = %code_key, rule = rule.label(), "resolved utility rule");
                return rule;
            }
        }

        debug!(state = %state_key, rule = state_rules.default.label(), "resolved state default rule");
        &state_rules.default
    }
}

/// Jurisdiction group selecting which rule table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Region {
    /// Ohio, Michigan, Illinois; state-level rules only.
    #[display(fmt = "Great Lakes")]
    GreatLakes,
    /// Maine, Massachusetts, New Hampshire, Rhode Island, Connecticut;
    /// state plus utility-specific rules.
    #[display(fmt = "New England")]
    NewEngland,
}

impl Region {
    /// Returns the process-wide rule table for this region.
    pub fn rules(self) -> &'static ValidityRuleTable {
        match self {
            Self::GreatLakes => &GREAT_LAKES_RULES,
            Self::NewEngland => &NEW_ENGLAND_RULES,
        }
    }
}

impl FromStr for Region {
    type Err = RuleError;

    /// Accepts the label variants seen on real case records, e.g.
    /// "Great Lakes Region", "GreatLakes", "GLR", "New England", "NE".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "great lakes" | "great lakes region" | "greatlakes" | "greatlakesregion" | "glr" => {
                return Ok(Self::GreatLakes);
            }
            "new england" | "new england region" | "newengland" | "newenglandregion" | "ne" => {
                return Ok(Self::NewEngland);
            }
            _ => {}
        }
        // Case records occasionally carry mangled labels; any mention of
        // "england" still identifies the region unambiguously.
        if normalized.contains("england") {
            return Ok(Self::NewEngland);
        }
        Err(RuleError::UnknownRegion(s.trim().to_owned()))
    }
}

const fn nz(months: u32) -> NonZeroU32 {
    match NonZeroU32::new(months) {
        Some(v) => v,
        None => panic!("validity periods are non-zero"),
    }
}

fn rule(months: NonZeroU32, label: &str) -> ValidityRule {
    ValidityRule {
        period_months: months,
        label: label.to_owned(),
    }
}

static GREAT_LAKES_RULES: Lazy<ValidityRuleTable> = Lazy::new(|| {
    ValidityRuleTable::new(rule(nz(12), "Great Lakes default (1 year)"))
        .with_state("OH", StateRules::new(rule(nz(12), "Ohio (1 year)")))
        .with_state("MI", StateRules::new(rule(nz(12), "Michigan (1 year)")))
        .with_state("IL", StateRules::new(rule(nz(6), "Illinois (6 months)")))
});

static NEW_ENGLAND_RULES: Lazy<ValidityRuleTable> = Lazy::new(|| {
    ValidityRuleTable::new(rule(nz(12), "New England default (1 year)"))
        .with_state(
            "ME",
            StateRules::new(rule(nz(12), "Maine (1 year)"))
                .with_utility("CMP", rule(nz(12), "CMP (1 year)"))
                .with_utility("BHE", rule(nz(12), "BHE (1 year)")),
        )
        .with_state(
            "MA",
            StateRules::new(rule(nz(12), "Massachusetts (1 year)"))
                .with_utility("BECO", rule(nz(12), "BECO (1 year)"))
                .with_utility("MECO", rule(nz(12), "MECO (1 year)"))
                .with_utility("WMECO", rule(nz(12), "WMECO (1 year)")),
        )
        .with_state(
            "NH",
            StateRules::new(rule(nz(12), "New Hampshire (1 year)"))
                .with_utility("GSECO", rule(nz(12), "GSECO (1 year)"))
                .with_utility("PSNH", rule(nz(12), "PSNH (1 year)")),
        )
        .with_state(
            "RI",
            StateRules::new(rule(nz(24), "Rhode Island (2 years)"))
                .with_utility("NECO", rule(nz(24), "NECO (2 years)")),
        )
        .with_state(
            "CT",
            StateRules::new(rule(nz(12), "Connecticut (1 year)"))
                .with_utility("CLP", rule(nz(12), "CLP (1 year)"))
                .with_utility("UI", rule(nz(12), "UI (1 year)")),
        )
});

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rule(months: u32, label: &str) -> ValidityRule {
        ValidityRule::new(months, label).expect("test rule period must be non-zero")
    }

    #[test]
    fn test_rule_rejects_zero_period() {
        let result = ValidityRule::new(0, "broken");
        assert_eq!(
            result,
            Err(RuleError::ZeroPeriod {
                label: "broken".to_owned()
            })
        );
    }

    #[test]
    fn test_rule_accessors() {
        let rule = test_rule(6, "Illinois (6 months)");
        assert_eq!(rule.period_months(), 6);
        assert_eq!(rule.label(), "Illinois (6 months)");
    }

    #[test]
    fn test_resolve_state_entry() {
        let table = Region::GreatLakes.rules();
        let rule = table.resolve("OH", None);
        assert_eq!(rule.period_months(), 12);
        assert_eq!(rule.label(), "Ohio (1 year)");

        let rule = table.resolve("IL", None);
        assert_eq!(rule.period_months(), 6);
    }

    #[test]
    fn test_resolve_unknown_state_falls_back_to_region_default() {
        let table = Region::GreatLakes.rules();
        let rule = table.resolve("TX", None);
        assert_eq!(rule, table.default_rule());

        let table = Region::NewEngland.rules();
        let rule = table.resolve("VT", Some("NECO"));
        assert_eq!(rule, table.default_rule());
    }

    #[test]
    fn test_resolve_utility_wins_over_state_default() {
        // Variant table where the utility rule differs from the state
        // default, proving which key the resolution actually came from.
        let table = ValidityRuleTable::new(test_rule(12, "default")).with_state(
            "RI",
            StateRules::new(test_rule(24, "Rhode Island (2 years)"))
                .with_utility("NECO", test_rule(36, "NECO (3 years)")),
        );

        let rule = table.resolve("RI", Some("NECO"));
        assert_eq!(rule.period_months(), 36);
        assert_eq!(rule.label(), "NECO (3 years)");

        let rule = table.resolve("RI", None);
        assert_eq!(rule.period_months(), 24);
    }

    #[test]
    fn test_resolve_neco_rhode_island() {
        let table = Region::NewEngland.rules();
        let rule = table.resolve("RI", Some("NECO"));
        assert_eq!(rule.period_months(), 24);
        assert_eq!(rule.label(), "NECO (2 years)");
    }

    #[test]
    fn test_resolve_unknown_utility_uses_state_default() {
        let table = Region::NewEngland.rules();
        let rule = table.resolve("RI", Some("UNKNOWN"));
        assert_eq!(rule.label(), "Rhode Island (2 years)");
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let table = Region::NewEngland.rules();
        let upper = table.resolve("RI", Some("NECO"));
        let lower = table.resolve("ri", Some("neco"));
        let padded = table.resolve(" Ri ", Some(" Neco "));
        assert_eq!(upper, lower);
        assert_eq!(upper, padded);
    }

    #[test]
    fn test_no_partial_utility_match() {
        let table = Region::NewEngland.rules();
        // "NEC" is not "NECO"; exact equality only.
        let rule = table.resolve("RI", Some("NEC"));
        assert_eq!(rule.label(), "Rhode Island (2 years)");
    }

    #[test]
    fn test_every_explicit_key_round_trips() {
        for region in [Region::GreatLakes, Region::NewEngland] {
            let table = region.rules();
            for (state, state_rules) in &table.states {
                assert_eq!(table.resolve(state, None), &state_rules.default);
                for (utility, rule) in &state_rules.utilities {
                    assert_eq!(table.resolve(state, Some(utility)), rule);
                }
            }
        }
    }

    #[test]
    fn test_region_from_str_aliases() {
        struct TestCase {
            input: &'static str,
            expected: Region,
            description: &'static str,
        }

        let cases = [
            TestCase {
                input: "Great Lakes",
                expected: Region::GreatLakes,
                description: "canonical label",
            },
            TestCase {
                input: "Great Lakes Region",
                expected: Region::GreatLakes,
                description: "long label",
            },
            TestCase {
                input: "GreatLakes",
                expected: Region::GreatLakes,
                description: "no-space label",
            },
            TestCase {
                input: "GLR",
                expected: Region::GreatLakes,
                description: "abbreviation",
            },
            TestCase {
                input: "New England",
                expected: Region::NewEngland,
                description: "canonical label",
            },
            TestCase {
                input: "NewEnglandRegion",
                expected: Region::NewEngland,
                description: "no-space long label",
            },
            TestCase {
                input: "NE",
                expected: Region::NewEngland,
                description: "abbreviation",
            },
            TestCase {
                input: "new england region (test)",
                expected: Region::NewEngland,
                description: "mangled label containing 'england'",
            },
        ];

        for case in &cases {
            let parsed = case
                .input
                .parse::<Region>()
                .unwrap_or_else(|e| panic!("{}: {e}", case.description));
            assert_eq!(parsed, case.expected, "{}", case.description);
        }
    }

    #[test]
    fn test_region_from_str_unknown() {
        let result = "Midwest".parse::<Region>();
        assert_eq!(result, Err(RuleError::UnknownRegion("Midwest".to_owned())));
    }

    #[test]
    fn test_region_display() {
        assert_eq!(Region::GreatLakes.to_string(), "Great Lakes");
        assert_eq!(Region::NewEngland.to_string(), "New England");
    }

    #[test]
    fn test_table_serde_round_trip() {
        let table = ValidityRuleTable::new(test_rule(12, "default")).with_state(
            "OH",
            StateRules::new(test_rule(12, "Ohio (1 year)")),
        );
        let json = serde_json::to_string(&table).expect("failed to serialize rule table");
        let parsed: ValidityRuleTable =
            serde_json::from_str(&json).expect("failed to deserialize rule table");
        assert_eq!(table, parsed);
    }
}
