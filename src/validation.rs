//! Template Lint - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy maps violations to actions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::fields::FieldValues;
use crate::parser::{DiagnosticKind, ParsedTemplate, SIGNATURE_END, SIGNATURE_START};
use crate::parties::{FallbackField, NamedEntity, SEPARATE_SITE_FLAG};
use crate::templates::{ContractTemplate, FailureMode};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
    pub template_id: String,
    pub template_version: String,
}

impl ValidationResult {
    pub fn success(template: &ContractTemplate, violations: Vec<ValidationViolation>) -> Self {
        Self {
            valid: true,
            violations,
            template_id: template.id.clone(),
            template_version: template.template_version.clone(),
        }
    }

    pub fn failure(template: &ContractTemplate, violations: Vec<ValidationViolation>) -> Self {
        Self {
            valid: false,
            violations,
            template_id: template.id.clone(),
            template_version: template.template_version.clone(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }
}

/// What a rule looks at: the parsed body and the values it will be rendered with.
pub struct LintInput<'a> {
    pub parsed: &'a ParsedTemplate,
    pub fields: &'a FieldValues,
}

/// Lint rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, input: &LintInput<'_>, template: &ContractTemplate) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct UnmatchedMarkerRule;

impl ValidationRule for UnmatchedMarkerRule {
    fn name(&self) -> &'static str { "unmatched_markers" }

    fn validate(&self, input: &LintInput<'_>, template: &ContractTemplate) -> Vec<ValidationViolation> {
        if !template.lint.rules.unmatched_markers.enabled {
            return vec![];
        }

        input.parsed.diagnostics.iter().map(|d| {
            let remediation = match d.kind {
                DiagnosticKind::UnmatchedClose => "Add the matching opening tag or remove the closing tag",
                DiagnosticKind::UnclosedSignature => "Close the section with [/SIGNATURE_SECTION]",
                DiagnosticKind::UnmatchedSignatureEnd => "Remove the stray [/SIGNATURE_SECTION]",
            };
            ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: format!("Unpaired marker left verbatim: {}", d),
                expected: None,
                actual: Some(d.marker.clone()),
                remediation: vec![remediation.to_string()],
            }
        }).collect()
    }
}

pub struct UnresolvedPlaceholderRule;

impl UnresolvedPlaceholderRule {
    fn resolvable(name: &str, fields: &FieldValues) -> bool {
        if NamedEntity::from_placeholder(name).is_some() || fields.get(name).is_some() {
            return true;
        }
        FallbackField::from_placeholder(name).is_some() && !fields.is_truthy(SEPARATE_SITE_FLAG)
    }
}

impl ValidationRule for UnresolvedPlaceholderRule {
    fn name(&self) -> &'static str { "unresolved_placeholders" }

    fn validate(&self, input: &LintInput<'_>, template: &ContractTemplate) -> Vec<ValidationViolation> {
        if !template.lint.rules.unresolved_placeholders.enabled {
            return vec![];
        }

        let missing: BTreeSet<&str> = input.parsed.placeholders()
            .into_iter()
            .filter(|name| !Self::resolvable(name, input.fields))
            .collect();

        missing.into_iter().map(|name| ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Warning,
            message: format!("No value for placeholder {{{{{}}}}}", name),
            expected: Some(name.to_string()),
            actual: None,
            remediation: vec![format!("Supply a value for field '{}'", name)],
        }).collect()
    }
}

pub struct SignatureSectionRule;

impl ValidationRule for SignatureSectionRule {
    fn name(&self) -> &'static str { "signature_section" }

    fn validate(&self, input: &LintInput<'_>, template: &ContractTemplate) -> Vec<ValidationViolation> {
        let rule = &template.lint.rules.signature_section;
        if !rule.enabled {
            return vec![];
        }

        let count = input.parsed.signature_count();
        if count > 1 {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: "More than one signature section".to_string(),
                expected: Some("1".to_string()),
                actual: Some(count.to_string()),
                remediation: vec!["Keep a single signature section at the end of the contract".to_string()],
            }];
        }
        if count == 0 && rule.required {
            return vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Signature section missing".to_string(),
                expected: Some("1".to_string()),
                actual: Some("0".to_string()),
                remediation: vec![format!("Add {}{}", SIGNATURE_START, SIGNATURE_END)],
            }];
        }
        vec![]
    }
}

/// Field values that look like template markers are inserted verbatim, never re-parsed.
pub struct MarkerInjectionRule;

impl MarkerInjectionRule {
    fn looks_like_marker(value: &str) -> bool {
        value.contains("{{") || value.contains(SIGNATURE_START) || value.contains(SIGNATURE_END)
    }
}

impl ValidationRule for MarkerInjectionRule {
    fn name(&self) -> &'static str { "marker_injection" }

    fn validate(&self, input: &LintInput<'_>, template: &ContractTemplate) -> Vec<ValidationViolation> {
        if !template.lint.rules.marker_injection.enabled {
            return vec![];
        }

        input.fields.iter()
            .filter_map(|(name, value)| value.as_text().map(|text| (name, text)))
            .filter(|(_, text)| Self::looks_like_marker(text))
            .map(|(name, text)| ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: format!("Field '{}' contains template marker syntax", name),
                expected: None,
                actual: Some(text.to_string()),
                remediation: vec!["Remove '{{' and signature markers from field values".to_string()],
            })
            .collect()
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(UnmatchedMarkerRule),
                Box::new(UnresolvedPlaceholderRule),
                Box::new(SignatureSectionRule),
                Box::new(MarkerInjectionRule),
            ],
        }
    }

    pub fn validate(&self, input: &LintInput<'_>, template: &ContractTemplate) -> ValidationResult {
        if !template.lint.required {
            return ValidationResult::success(template, vec![]);
        }

        let mut all_violations = vec![];

        for rule in &self.rules {
            let violations = rule.validate(input, template);
            all_violations.extend(violations);
        }

        // Apply failure mode policy
        let has_errors = all_violations.iter()
            .any(|v| v.severity == ViolationSeverity::Error);

        match template.lint.failure_mode {
            FailureMode::Block if has_errors => {
                ValidationResult::failure(template, all_violations)
            }
            FailureMode::Block => ValidationResult::success(template, all_violations),
            FailureMode::Warn => {
                for v in &all_violations {
                    tracing::warn!(template = %template.id, rule = %v.rule, "{}", v.message);
                }
                ValidationResult::success(template, all_violations)
            }
            FailureMode::Log => {
                for v in &all_violations {
                    tracing::info!(template = %template.id, rule = %v.rule, "{}", v.message);
                }
                ValidationResult::success(template, all_violations)
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
