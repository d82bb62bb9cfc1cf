//! Fingerprints for persisted quotes and rendered contracts
//!
//! A stored record can be checked against a fresh recalculation: the same
//! pricing input, or the same template + context + engine, always hashes the
//! same.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::pricing::PricingInput;
use crate::render::RenderContext;

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Serialize with object keys sorted at every depth and no whitespace.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&canonicalize(serde_json::to_value(value)?))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Fingerprint of a pricing input, stored on a quote.
pub fn compute_quote_hash(input: &PricingInput) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_json(input)?.as_bytes()))
}

/// Fingerprint of rendered contract text, over its UTF-8 bytes.
pub fn compute_content_hash(content: &str) -> String {
    sha256_hex(content.as_bytes())
}

/// Identifies one render job.
///
/// Fields are length-prefixed so no two distinct jobs share a preimage.
pub fn compute_job_hash(
    template_id: &str,
    template_version: &str,
    context: &RenderContext,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let context = canonical_json(context)?;
    let mut hasher = Sha256::new();
    for part in [template_id, template_version, context.as_str(), engine_version] {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part.as_bytes());
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldValues;
    use crate::pricing::{OtherCost, ProfitPolicy};
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let value = json!({"z": 1, "a": {"y": [{"b": 1, "a": 2}], "x": null}});
        assert_eq!(canonical_json(&value).unwrap(), r#"{"a":{"x":null,"y":[{"a":2,"b":1}]},"z":1}"#);
    }

    #[test]
    fn test_content_hash_is_over_raw_text() {
        assert_eq!(
            compute_content_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_quote_hash_tracks_input() {
        let input = PricingInput {
            other_costs: vec![OtherCost { name: "base".into(), amount: 10.0 }],
            quantity: 3.0,
            ..PricingInput::default()
        };
        let same = input.clone();
        let changed = PricingInput { profit: ProfitPolicy::Fixed { value: 1.0 }, ..input.clone() };

        assert_eq!(compute_quote_hash(&input).unwrap(), compute_quote_hash(&same).unwrap());
        assert_ne!(compute_quote_hash(&input).unwrap(), compute_quote_hash(&changed).unwrap());
    }

    #[test]
    fn test_job_hash_depends_on_every_part() {
        let context = RenderContext::new(FieldValues::new().with("name", "Acme"));
        let base = compute_job_hash("nda", "1.0.0", &context, "1.0.0").unwrap();

        assert_eq!(base, compute_job_hash("nda", "1.0.0", &context, "1.0.0").unwrap());
        assert_ne!(base, compute_job_hash("nda", "1.1.0", &context, "1.0.0").unwrap());
        assert_ne!(base, compute_job_hash("nda", "1.0.0", &context, "1.0.1").unwrap());
        assert_ne!(base, compute_job_hash("nda", "1.0.0", &RenderContext::default(), "1.0.0").unwrap());
        // Shifting text between fields changes the hash
        assert_ne!(
            compute_job_hash("ab", "c", &context, "1.0.0").unwrap(),
            compute_job_hash("a", "bc", &context, "1.0.0").unwrap()
        );
    }
}
