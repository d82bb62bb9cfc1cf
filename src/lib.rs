//! Quoteworks Core - Pricing and Contract Engine
//!
//! Two independent calculators:
//! 1. Pricing: cost breakdown in, unit and total price out
//! 2. Contracts: template text plus field values in, final contract text out
//!
//! Both are pure. Persistence, PDF export and UI belong to the host application.

pub mod lenient;
pub mod units;
pub mod format;
pub mod pricing;
pub mod currency;
pub mod quote;
pub mod fields;
pub mod parties;
pub mod parser;
pub mod signature;
pub mod render;
pub mod templates;
pub mod validation;
pub mod hashing;
pub mod config;
pub mod pipeline;

pub use pricing::{calculate_pricing, CostLine, OtherCost, PricingInput, PricingResult, ProfitPolicy};
pub use currency::{convert, try_convert, CurrencySnapshot};
pub use quote::Quote;
pub use fields::{is_truthy, FieldValue, FieldValues};
pub use parties::PartyInfo;
pub use render::{render_contract, RenderContext, Renderer};
pub use templates::{ContractTemplate, TemplateId, TemplateRegistry};
pub use validation::{ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity};
pub use hashing::{canonical_json, compute_content_hash, compute_job_hash, compute_quote_hash};
pub use config::EngineConfig;
pub use pipeline::{ContractPipeline, PipelineError, RenderRequest, RenderedContract};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
