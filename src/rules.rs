//! Threshold rule configuration

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Kind of rule and the shape of its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Flag transactions above an amount
    AmountThreshold,
    /// Number of transactions within a period
    FrequencyThreshold,
    /// Percentage change in volume
    VelocityThreshold,
    /// Comma-separated country/region codes
    GeographicRestriction,
    /// Named behavioural pattern
    SuspiciousPattern,
}

impl RuleKind {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            RuleKind::AmountThreshold | RuleKind::FrequencyThreshold | RuleKind::VelocityThreshold
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            RuleKind::AmountThreshold => "Amount Threshold",
            RuleKind::FrequencyThreshold => "Transaction Frequency",
            RuleKind::VelocityThreshold => "Velocity Check",
            RuleKind::GeographicRestriction => "Geographic Restriction",
            RuleKind::SuspiciousPattern => "Suspicious Pattern",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rule parameter: a number for threshold kinds, text otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Number(n) => write!(f, "{}", n),
            RuleValue::Text(s) => f.write_str(s),
        }
    }
}

/// A configured rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub value: RuleValue,
    pub enabled: bool,
}

/// User input for a new rule; `value` is the raw form text
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleDraft {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub value: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl RuleDraft {
    /// Check the draft and convert its value to the kind's type
    pub fn validate(&self) -> Result<RuleValue, RuleError> {
        if self.name.trim().chars().count() < 2 {
            return Err(RuleError::NameTooShort);
        }
        if self.description.trim().chars().count() < 5 {
            return Err(RuleError::DescriptionTooShort);
        }

        let raw = self.value.trim();
        if self.kind.is_numeric() {
            match raw.parse::<f64>() {
                Ok(n) if n.is_finite() && n >= 0.0 => Ok(RuleValue::Number(n)),
                _ => Err(RuleError::InvalidValue {
                    kind: self.kind.label().to_string(),
                    expected: "a non-negative number",
                    value: self.value.clone(),
                }),
            }
        } else if raw.is_empty() {
            Err(RuleError::InvalidValue {
                kind: self.kind.label().to_string(),
                expected: "non-empty text",
                value: self.value.clone(),
            })
        } else {
            Ok(RuleValue::Text(raw.to_string()))
        }
    }
}

/// Ordered collection of rules
#[derive(Debug, Clone)]
pub struct RuleBook {
    rules: Vec<Rule>,
}

impl RuleBook {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Validate and append a rule, returning the stored copy
    pub fn add(&mut self, draft: RuleDraft) -> Result<&Rule, RuleError> {
        let value = draft.validate()?;
        let rule = Rule {
            id: format!("rule-{:03}", self.rules.len() + 1),
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            kind: draft.kind,
            value,
            enabled: draft.enabled,
        };

        info!(rule_id = %rule.id, kind = %rule.kind, value = %rule.value, "Rule added");
        self.rules.push(rule);
        Ok(&self.rules[self.rules.len() - 1])
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), RuleError> {
        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RuleError::NotFound(id.to_string()))?;
        rule.enabled = enabled;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn list(&self) -> &[Rule] {
        &self.rules
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleBook {
    /// Seeded with the stock high-value and high-risk-country rules
    fn default() -> Self {
        Self {
            rules: vec![
                Rule {
                    id: "rule-001".to_string(),
                    name: "High Value Transaction".to_string(),
                    description: "Flag transactions above $5,000 for review".to_string(),
                    kind: RuleKind::AmountThreshold,
                    value: RuleValue::Number(5000.0),
                    enabled: true,
                },
                Rule {
                    id: "rule-002".to_string(),
                    name: "Suspicious Countries".to_string(),
                    description: "Flag transactions from high-risk countries".to_string(),
                    kind: RuleKind::GeographicRestriction,
                    value: RuleValue::Text("IRN,PRK,MMR".to_string()),
                    enabled: true,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: RuleKind, value: &str) -> RuleDraft {
        RuleDraft {
            name: "Burst".to_string(),
            description: "Many payments in one hour".to_string(),
            kind,
            value: value.to_string(),
            enabled: true,
        }
    }

    #[test]
    fn test_default_rules() {
        let book = RuleBook::default();
        assert_eq!(book.len(), 2);
        assert_eq!(book.get("rule-001").unwrap().value, RuleValue::Number(5000.0));
        assert_eq!(
            book.get("rule-002").unwrap().value,
            RuleValue::Text("IRN,PRK,MMR".to_string())
        );
    }

    #[test]
    fn test_add_assigns_sequential_id() {
        let mut book = RuleBook::default();
        let rule = book.add(draft(RuleKind::FrequencyThreshold, " 50 ")).unwrap();
        assert_eq!(rule.id, "rule-003");
        assert_eq!(rule.value, RuleValue::Number(50.0));
    }

    #[test]
    fn test_validation_errors() {
        let mut book = RuleBook::empty();

        let mut short = draft(RuleKind::AmountThreshold, "10");
        short.name = "X".to_string();
        assert!(matches!(book.add(short), Err(RuleError::NameTooShort)));

        let mut vague = draft(RuleKind::AmountThreshold, "10");
        vague.description = "hm".to_string();
        assert!(matches!(book.add(vague), Err(RuleError::DescriptionTooShort)));

        assert!(matches!(
            book.add(draft(RuleKind::VelocityThreshold, "fast")),
            Err(RuleError::InvalidValue { .. })
        ));
        assert!(matches!(
            book.add(draft(RuleKind::AmountThreshold, "-5")),
            Err(RuleError::InvalidValue { .. })
        ));
        assert!(matches!(
            book.add(draft(RuleKind::SuspiciousPattern, "   ")),
            Err(RuleError::InvalidValue { .. })
        ));
        assert!(book.is_empty());
    }

    #[test]
    fn test_toggle_and_enabled() {
        let mut book = RuleBook::default();
        book.set_enabled("rule-001", false).unwrap();

        let enabled: Vec<&str> = book.enabled().map(|r| r.id.as_str()).collect();
        assert_eq!(enabled, vec!["rule-002"]);
        assert_eq!(
            book.set_enabled("rule-999", true),
            Err(RuleError::NotFound("rule-999".to_string()))
        );
    }

    #[test]
    fn test_rule_serialization_uses_type_key() {
        let book = RuleBook::default();
        let json = serde_json::to_value(&book.list()[0]).unwrap();
        assert_eq!(json["type"], "amount_threshold");
        assert_eq!(json["value"], 5000.0);
    }
}
