//! Contract Templates - registry and lint configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::parser::{parse, parse_strict, ParsedTemplate, TemplateError};

pub type TemplateId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractTemplate {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: ContractKind,
    pub template_version: String,
    pub engine_min_version: String,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub superseded_by: Option<String>,
    pub body: String,
    #[serde(default)]
    pub lint: LintConfig,
}

impl ContractTemplate {
    pub fn parse(&self) -> ParsedTemplate {
        parse(&self.body)
    }

    pub fn parse_strict(&self) -> Result<ParsedTemplate, TemplateError> {
        parse_strict(&self.body)
    }
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    Manufacturing,
    Supply,
    Distribution,
    Service,
    #[default]
    General,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintConfig {
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub failure_mode: FailureMode,
    #[serde(default)]
    pub rules: LintRules,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            required: true,
            failure_mode: FailureMode::default(),
            rules: LintRules::default(),
        }
    }
}

/// What a lint error does to rendering.
///
/// `Warn` keeps unpaired markers in the output and records them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    Block,
    #[default]
    Warn,
    Log,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintRules {
    #[serde(default)]
    pub unmatched_markers: RuleConfig,
    #[serde(default)]
    pub unresolved_placeholders: RuleConfig,
    #[serde(default)]
    pub signature_section: SignatureRule,
    #[serde(default)]
    pub marker_injection: RuleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureRule {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Require exactly one signature section
    #[serde(default)]
    pub required: bool,
}

impl Default for SignatureRule {
    fn default() -> Self {
        Self { enabled: true, required: false }
    }
}

/// Template registry - loads and caches templates
pub struct TemplateRegistry {
    templates: HashMap<TemplateId, ContractTemplate>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self { templates: HashMap::new() }
    }

    /// Load every `*.json` template in `dir`. Unreadable or invalid files are skipped.
    pub fn load_from_dir(dir: &Path) -> Result<Self, std::io::Error> {
        let mut registry = Self::new();
        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "template directory does not exist");
            return Ok(registry);
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == "json") {
                let loaded = fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|content| {
                        serde_json::from_str::<ContractTemplate>(&content).map_err(|e| e.to_string())
                    });
                match loaded {
                    Ok(template) => {
                        tracing::debug!(id = %template.id, path = %path.display(), "template loaded");
                        registry.register(template);
                    }
                    Err(error) => {
                        tracing::warn!(path = %path.display(), %error, "skipping invalid template");
                    }
                }
            }
        }
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&ContractTemplate> {
        self.templates.get(id)
    }

    pub fn list(&self) -> Vec<&ContractTemplate> {
        let mut all: Vec<_> = self.templates.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub fn register(&mut self, template: ContractTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_template_defaults() {
        let template: ContractTemplate = serde_json::from_value(json!({
            "id": "supply",
            "name": "Supply Agreement",
            "templateVersion": "1.0.0",
            "engineMinVersion": "1.0.0",
            "body": "Between {{companyName}} and us."
        }))
        .unwrap();

        assert_eq!(template.kind, ContractKind::General);
        assert!(template.lint.required);
        assert_eq!(template.lint.failure_mode, FailureMode::Warn);
        assert!(template.lint.rules.unmatched_markers.enabled);
        assert!(!template.lint.rules.signature_section.required);
        assert_eq!(template.parse().placeholders(), vec!["companyName"]);
    }

    #[test]
    fn test_load_from_dir_skips_invalid() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("nda.json"),
            json!({
                "id": "nda",
                "name": "NDA",
                "kind": "service",
                "templateVersion": "1.2.0",
                "engineMinVersion": "1.0.0",
                "body": "NDA for {{companyName}}"
            })
            .to_string(),
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let registry = TemplateRegistry::load_from_dir(dir.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("nda").unwrap().kind, ContractKind::Service);
    }

    #[test]
    fn test_missing_dir_is_empty_registry() {
        let registry = TemplateRegistry::load_from_dir(Path::new("/definitely/not/here")).unwrap();
        assert!(registry.is_empty());
    }
}
