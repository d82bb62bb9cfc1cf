//! Contract Pipeline - Single Entry Point
//!
//! CRITICAL: render_contract MUST call lint_template internally. No bypass.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::templates::{ContractTemplate, TemplateRegistry};
use crate::validation::{LintInput, Validator, ValidationResult};
use crate::render::{RenderContext, RenderSettings, Renderer};
use crate::hashing::{compute_content_hash, compute_job_hash};
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static LINT_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_lint_call_count() -> u32 {
    LINT_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_lint_call_count() {
    LINT_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Lint failed: {0}")]
    LintFailed(String),

    #[error("Template version {0} requires engine >= {1}, current is {2}")]
    EngineVersionMismatch(String, String, String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub template_id: String,
    #[serde(default)]
    pub context: RenderContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedContract {
    pub id: String,
    pub template_id: String,
    pub template_version: String,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub content_hash: String,
    pub job_hash: String,
    pub lint: ValidationResult,
}

/// The contract pipeline - single entry point for all template operations
pub struct ContractPipeline {
    registry: TemplateRegistry,
    validator: Validator,
    renderer: Renderer,
}

impl ContractPipeline {
    pub fn new(registry: TemplateRegistry) -> Self {
        Self::with_settings(registry, RenderSettings::default())
    }

    pub fn with_settings(registry: TemplateRegistry, settings: RenderSettings) -> Self {
        Self {
            registry,
            validator: Validator::new(),
            renderer: Renderer::new(settings),
        }
    }

    /// List all available templates
    pub fn list_templates(&self) -> Vec<&ContractTemplate> {
        self.registry.list()
    }

    /// Get a specific template
    pub fn get_template(&self, id: &str) -> Option<&ContractTemplate> {
        self.registry.get(id)
    }

    /// Lint a template against the values it will be rendered with
    ///
    /// This is the ONLY lint entry point.
    pub fn lint_template(
        &self,
        template_id: &str,
        context: &RenderContext,
    ) -> Result<ValidationResult, PipelineError> {
        #[cfg(feature = "test-hooks")]
        LINT_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let template = self.registry.get(template_id)
            .ok_or_else(|| PipelineError::TemplateNotFound(template_id.to_string()))?;

        self.check_engine_version(template)?;

        let parsed = template.parse();
        Ok(self.validator.validate(&LintInput { parsed: &parsed, fields: &context.fields }, template))
    }

    /// Render a contract
    ///
    /// CRITICAL: This ALWAYS calls lint_template internally. No bypass possible.
    pub fn render_contract(&self, request: &RenderRequest) -> Result<RenderedContract, PipelineError> {
        let template = self.registry.get(&request.template_id)
            .ok_or_else(|| PipelineError::TemplateNotFound(request.template_id.clone()))?;

        // MANDATORY: Lint is always called. This is non-negotiable.
        let lint = self.lint_template(&request.template_id, &request.context)?;

        if !lint.valid {
            let messages: Vec<_> = lint.violations.iter()
                .map(|v| format!("{}: {}", v.rule, v.message))
                .collect();
            return Err(PipelineError::LintFailed(messages.join("; ")));
        }

        if template.deprecated {
            tracing::warn!(
                template = %template.id,
                superseded_by = ?template.superseded_by,
                "rendering deprecated template"
            );
        }

        let content = self.renderer.render(&template.body, &request.context);
        let content_hash = compute_content_hash(&content);
        let job_hash = compute_job_hash(
            &request.template_id,
            &template.template_version,
            &request.context,
            ENGINE_VERSION,
        )?;

        tracing::info!(template = %template.id, %content_hash, "contract rendered");

        Ok(RenderedContract {
            id: Uuid::new_v4().to_string(),
            template_id: request.template_id.clone(),
            template_version: template.template_version.clone(),
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            content,
            content_hash,
            job_hash,
            lint,
        })
    }

    fn check_engine_version(&self, template: &ContractTemplate) -> Result<(), PipelineError> {
        let engine_ver = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| PipelineError::InvalidVersion("Invalid engine version".into()))?;
        let min_ver = semver::Version::parse(&template.engine_min_version)
            .map_err(|_| PipelineError::InvalidVersion(format!(
                "Invalid engineMinVersion '{}' in template {}",
                template.engine_min_version, template.id
            )))?;

        if engine_ver < min_ver {
            return Err(PipelineError::EngineVersionMismatch(
                template.template_version.clone(),
                template.engine_min_version.clone(),
                ENGINE_VERSION.to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ContractPipeline {
    fn default() -> Self {
        Self::new(TemplateRegistry::default())
    }
}
