//! Quoteworks CLI - Bridge interface for the admin application
//!
//! Commands: price, convert, templates, lint, render
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on blocked lint or rejected exchange rate

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use quoteworks_core::{
    calculate_pricing, try_convert, ContractPipeline, EngineConfig, PipelineError, PricingInput,
    RenderContext, RenderRequest, TemplateRegistry,
};

#[derive(Parser)]
#[command(name = "quoteworks-cli")]
#[command(about = "Quoteworks CLI - pricing and contract templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to engine config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to templates directory, overrides the config value
    #[arg(short, long)]
    templates_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate unit and total price
    Price {
        /// JSON payload (PricingInput)
        #[arg(short, long)]
        payload: String,

        /// Also convert into this currency
        #[arg(long, requires = "rate")]
        currency: Option<String>,

        /// Home currency units per foreign unit
        #[arg(long, requires = "currency")]
        rate: Option<f64>,
    },

    /// Convert prices into a foreign currency
    Convert {
        #[arg(long)]
        unit_price: f64,

        #[arg(long)]
        total_price: f64,

        #[arg(long)]
        currency: String,

        #[arg(long)]
        rate: f64,
    },

    /// List available contract templates
    Templates,

    /// Lint a template against field values
    Lint {
        /// Template ID
        #[arg(short, long)]
        template: String,

        /// JSON payload (RenderContext)
        #[arg(short, long, default_value = "{}")]
        payload: String,
    },

    /// Render a contract
    Render {
        /// Template ID
        #[arg(short, long)]
        template: String,

        /// JSON payload (RenderContext)
        #[arg(short, long, default_value = "{}")]
        payload: String,
    },
}

fn emit<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("failed to serialize output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn fail(key: &str, message: String, code: u8) -> ExitCode {
    let output = serde_json::json!({ key: false, "error": message });
    println!("{}", output);
    ExitCode::from(code)
}

/// 2 for a blocked lint, 1 for everything else.
fn exit_code(error: &PipelineError) -> u8 {
    match error {
        PipelineError::LintFailed(_) => 2,
        _ => 1,
    }
}

fn load_pipeline(config: &EngineConfig) -> Result<ContractPipeline, std::io::Error> {
    let registry = TemplateRegistry::load_from_dir(&config.templates_dir)?;
    tracing::info!(count = registry.len(), dir = %config.templates_dir.display(), "templates loaded");
    Ok(ContractPipeline::with_settings(registry, config.render.clone()))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quoteworks_core=info,quoteworks_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match EngineConfig::resolve(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => return fail("success", e.to_string(), 1),
    };
    if let Some(dir) = cli.templates_dir {
        config.templates_dir = dir;
    }

    match cli.command {
        Commands::Price { payload, currency, rate } => {
            let input: PricingInput = match serde_json::from_str(&payload) {
                Ok(i) => i,
                Err(e) => return fail("success", format!("Invalid payload: {}", e), 1),
            };

            let result = calculate_pricing(&input);
            let conversion = match (currency, rate) {
                (Some(code), Some(rate)) => {
                    match try_convert(result.unit_price, result.total_price, &code, rate) {
                        Ok(snapshot) => Some(snapshot),
                        Err(e) => return fail("success", e.to_string(), 2),
                    }
                }
                _ => None,
            };

            emit(&serde_json::json!({
                "success": true,
                "result": result,
                "display": result.to_display_with(config.display_decimals),
                "conversion": conversion,
            }))
        }

        Commands::Convert { unit_price, total_price, currency, rate } => {
            match try_convert(unit_price, total_price, &currency, rate) {
                Ok(snapshot) => emit(&serde_json::json!({
                    "success": true,
                    "snapshot": snapshot,
                })),
                Err(e) => fail("success", e.to_string(), 2),
            }
        }

        Commands::Templates => {
            let pipeline = match load_pipeline(&config) {
                Ok(p) => p,
                Err(e) => return fail("success", format!("Failed to load templates: {}", e), 1),
            };
            let templates: Vec<_> = pipeline.list_templates()
                .iter()
                .map(|t| serde_json::json!({
                    "id": t.id,
                    "name": t.name,
                    "kind": t.kind,
                    "version": t.template_version,
                    "deprecated": t.deprecated,
                    "supersededBy": t.superseded_by,
                }))
                .collect();
            emit(&templates)
        }

        Commands::Lint { template, payload } => {
            let pipeline = match load_pipeline(&config) {
                Ok(p) => p,
                Err(e) => return fail("valid", format!("Failed to load templates: {}", e), 1),
            };
            let context: RenderContext = match serde_json::from_str(&payload) {
                Ok(c) => c,
                Err(e) => return fail("valid", format!("Invalid payload: {}", e), 1),
            };

            match pipeline.lint_template(&template, &context) {
                Ok(result) => {
                    let code = emit(&result);
                    if result.valid { code } else { ExitCode::from(2) }
                }
                Err(e) => fail("valid", e.to_string(), 1),
            }
        }

        Commands::Render { template, payload } => {
            let pipeline = match load_pipeline(&config) {
                Ok(p) => p,
                Err(e) => return fail("success", format!("Failed to load templates: {}", e), 1),
            };
            let context: RenderContext = match serde_json::from_str(&payload) {
                Ok(c) => c,
                Err(e) => return fail("success", format!("Invalid payload: {}", e), 1),
            };

            let request = RenderRequest { template_id: template, context };
            match pipeline.render_contract(&request) {
                Ok(contract) => emit(&serde_json::json!({
                    "success": true,
                    "contract": contract,
                })),
                Err(e) => fail("success", e.to_string(), exit_code(&e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_blocked_lint_exits_two() {
        assert_eq!(exit_code(&PipelineError::LintFailed("x".into())), 2);
        assert_eq!(exit_code(&PipelineError::TemplateNotFound("nda".into())), 1);
        assert_eq!(exit_code(&PipelineError::InvalidVersion("bad".into())), 1);
    }
}
