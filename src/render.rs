//! Template Renderer
//!
//! Resolves a parsed contract template against field values and party info.
//! Placeholder precedence, highest first:
//! 1. manufacturer fallback group, when the separate-site flag is falsy
//! 2. named entities from the counterparty record (missing -> empty)
//! 3. generic field values
//! 4. otherwise left verbatim
//!
//! Substituted values are written once and never re-parsed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::fields::FieldValues;
use crate::parser::{parse, Node, ParsedTemplate};
use crate::parties::{FallbackField, ManufacturerIdentity, NamedEntity, PartyInfo, SEPARATE_SITE_FLAG};
use crate::signature::{signature_block, SignatureDefaults};

/// Per-call data. Nothing here outlives the render.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderContext {
    pub fields: FieldValues,
    pub counterparty: PartyInfo,
    pub customer: PartyInfo,
    pub signed_on: Option<NaiveDate>,
}

impl RenderContext {
    pub fn new(fields: FieldValues) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn with_counterparty(mut self, counterparty: PartyInfo) -> Self {
        self.counterparty = counterparty;
        self
    }

    pub fn with_customer(mut self, customer: PartyInfo) -> Self {
        self.customer = customer;
        self
    }

    pub fn signed_on(mut self, date: NaiveDate) -> Self {
        self.signed_on = Some(date);
        self
    }
}

/// Renderer-wide constants, resolved once from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderSettings {
    pub fallback_manufacturer: ManufacturerIdentity,
    pub signature: SignatureDefaults,
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    settings: RenderSettings,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn render(&self, source: &str, ctx: &RenderContext) -> String {
        self.render_parsed(&parse(source), ctx)
    }

    pub fn render_parsed(&self, template: &ParsedTemplate, ctx: &RenderContext) -> String {
        if !template.is_well_formed() {
            tracing::warn!(
                diagnostics = template.diagnostics.len(),
                "rendering template with unpaired markers left verbatim"
            );
        }
        let mut out = String::new();
        self.render_nodes(&template.nodes, ctx, &mut out);
        out
    }

    fn render_nodes(&self, nodes: &[Node], ctx: &RenderContext, out: &mut String) {
        for node in nodes {
            match node {
                Node::Text { text } | Node::Verbatim { text } => out.push_str(text),
                Node::Placeholder { name } => match self.resolve(name, ctx) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                },
                Node::Conditional { name, children } => {
                    if ctx.fields.is_truthy(name) {
                        self.render_nodes(children, ctx, out);
                    }
                }
                Node::Signature => out.push_str(&signature_block(
                    &ctx.counterparty,
                    &ctx.customer,
                    ctx.signed_on,
                    &self.settings.signature,
                )),
            }
        }
    }

    /// Value for a placeholder, `None` when nothing supplies it.
    pub fn resolve<'a>(&'a self, name: &str, ctx: &'a RenderContext) -> Option<Cow<'a, str>> {
        if let Some(field) = FallbackField::from_placeholder(name) {
            if !ctx.fields.is_truthy(SEPARATE_SITE_FLAG) {
                return Some(Cow::Borrowed(field.value(&self.settings.fallback_manufacturer)));
            }
        }
        if let Some(entity) = NamedEntity::from_placeholder(name) {
            return Some(Cow::Borrowed(entity.value(&ctx.counterparty)));
        }
        ctx.fields.get(name).map(|v| Cow::Owned(v.render()))
    }
}

/// Render with default settings.
pub fn render_contract(source: &str, ctx: &RenderContext) -> String {
    Renderer::default().render(source, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parties::DEFAULT_MANUFACTURER_NAME;

    fn ctx(fields: FieldValues) -> RenderContext {
        RenderContext::new(fields)
    }

    #[test]
    fn test_generic_substitution_is_global() {
        let out = render_contract("{{a}}-{{a}}-{{b}}", &ctx(FieldValues::new().with("a", "x").with("b", 2_i64)));
        assert_eq!(out, "x-x-2");
    }

    #[test]
    fn test_free_form_keys_substituted() {
        let fields = FieldValues::new()
            .with("start-date", "2026-01-01")
            .with("ürünAdı", "Krem")
            .with("buyer name", "Acme");
        let out = render_contract("{{start-date}}|{{ürünAdı}}|{{buyer name}}|{{ buyer name }}", &ctx(fields));
        assert_eq!(out, "2026-01-01|Krem|Acme|{{ buyer name }}");
    }

    #[test]
    fn test_case_sensitive_and_unknown_left() {
        let out = render_contract("{{Name}} {{name}}", &ctx(FieldValues::new().with("name", "n")));
        assert_eq!(out, "{{Name}} n");
    }

    #[test]
    fn test_named_entities_beat_fields_and_default_to_empty() {
        let context = ctx(FieldValues::new().with("companyName", "from fields"))
            .with_counterparty(PartyInfo::named("Acme"));
        let out = render_contract("{{companyName}}|{{taxNumber}}|", &context);
        assert_eq!(out, "Acme||");
    }

    #[test]
    fn test_conditional_body_is_substituted() {
        let fields = FieldValues::new().with("vat", true).with("rate", 20_i64);
        let out = render_contract("Price{{vat}} + VAT {{rate}}%{{/vat}}.", &ctx(fields));
        assert_eq!(out, "Price + VAT 20%.");
    }

    #[test]
    fn test_conditional_drops_block_and_missing_flag_is_falsy() {
        let out = render_contract("a{{x}}hidden {{y}}{{/x}}b", &ctx(FieldValues::new().with("y", "z")));
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_nested_conditionals() {
        let fields = FieldValues::new().with("outer", "yes").with("inner", "0");
        let out = render_contract("[{{outer}}o{{inner}}i{{/inner}}{{/outer}}]", &ctx(fields));
        assert_eq!(out, "[o]");
    }

    #[test]
    fn test_fallback_group_overrides_fields() {
        let fields = FieldValues::new()
            .with(SEPARATE_SITE_FLAG, false)
            .with("manufacturerName", "Own Site Inc.");
        let out = render_contract("{{manufacturerName}}", &ctx(fields));
        assert_eq!(out, DEFAULT_MANUFACTURER_NAME);
    }

    #[test]
    fn test_separate_site_uses_fields() {
        let fields = FieldValues::new()
            .with(SEPARATE_SITE_FLAG, "true")
            .with("manufacturerName", "Own Site Inc.");
        let out = render_contract("{{manufacturerName}}/{{manufacturerAddress}}", &ctx(fields));
        assert_eq!(out, "Own Site Inc./{{manufacturerAddress}}");
    }

    #[test]
    fn test_signature_replaced_wholesale() {
        let context = ctx(FieldValues::new())
            .with_counterparty(PartyInfo::named("Acme"))
            .with_customer(PartyInfo::named("Globex"));
        let out = render_contract("Terms.[SIGNATURE_SECTION]draft[/SIGNATURE_SECTION]", &context);
        assert!(out.starts_with("Terms.<div class=\"signature-section\""));
        assert!(!out.contains("draft"));
        assert!(!out.contains("SIGNATURE_SECTION"));
        assert!(out.contains("Globex"));
    }

    #[test]
    fn test_values_are_not_reparsed() {
        let fields = FieldValues::new().with("a", "{{b}}").with("b", "nope");
        assert_eq!(render_contract("{{a}}", &ctx(fields)), "{{b}}");
    }

    #[test]
    fn test_unmatched_markers_survive() {
        let out = render_contract("x{{/y}}z[/SIGNATURE_SECTION]", &ctx(FieldValues::new()));
        assert_eq!(out, "x{{/y}}z[/SIGNATURE_SECTION]");
    }

    #[test]
    fn test_custom_fallback_settings() {
        let settings = RenderSettings {
            fallback_manufacturer: ManufacturerIdentity {
                name: "Plant 2".into(),
                ..ManufacturerIdentity::default()
            },
            ..RenderSettings::default()
        };
        let out = Renderer::new(settings).render("{{manufacturerName}}", &ctx(FieldValues::new()));
        assert_eq!(out, "Plant 2");
    }
}
