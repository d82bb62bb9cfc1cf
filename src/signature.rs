//! Signature block generation
//!
//! Replaces the `[SIGNATURE_SECTION]` region with a two-column layout:
//! counterparty on the left, customer on the right.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::parties::PartyInfo;

/// Literal text used when a party field is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignatureDefaults {
    pub counterparty_heading: String,
    pub customer_heading: String,
    pub signatory: String,
    pub signature_caption: String,
    pub date_label: String,
    pub blank_date: String,
    pub date_format: String,
}

impl Default for SignatureDefaults {
    fn default() -> Self {
        Self {
            counterparty_heading: "COUNTERPARTY".to_string(),
            customer_heading: "CUSTOMER".to_string(),
            signatory: "Authorized Signatory".to_string(),
            signature_caption: "Signature / Stamp".to_string(),
            date_label: "Date".to_string(),
            blank_date: "____/____/______".to_string(),
            date_format: "%d.%m.%Y".to_string(),
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn party_column(heading: &str, party: &PartyInfo, date: &str, defaults: &SignatureDefaults) -> String {
    format!(
        concat!(
            "<div class=\"signature-party\" style=\"width:45%;text-align:center\">",
            "<p><strong>{heading}</strong></p>",
            "<p>{name}</p>",
            "<p>{signatory}</p>",
            "<p>{date_label}: {date}</p>",
            "<div class=\"signature-line\" style=\"border-bottom:1px solid #000;height:60px\"></div>",
            "<p>{caption}</p>",
            "</div>"
        ),
        heading = escape_html(heading),
        name = escape_html(or_default(&party.company_name, heading)),
        signatory = escape_html(or_default(&party.contact_person, &defaults.signatory)),
        date_label = escape_html(&defaults.date_label),
        date = escape_html(date),
        caption = escape_html(&defaults.signature_caption),
    )
}

/// Generate the two-party signature markup.
pub fn signature_block(
    counterparty: &PartyInfo,
    customer: &PartyInfo,
    signed_on: Option<NaiveDate>,
    defaults: &SignatureDefaults,
) -> String {
    let date = signed_on
        .and_then(|d| {
            let mut out = String::new();
            // Invalid format strings surface as fmt::Error
            write!(out, "{}", d.format(&defaults.date_format)).ok().map(|_| out)
        })
        .unwrap_or_else(|| defaults.blank_date.clone());

    format!(
        "<div class=\"signature-section\" style=\"display:flex;justify-content:space-between;margin-top:48px\">{}{}</div>",
        party_column(&defaults.counterparty_heading, counterparty, &date, defaults),
        party_column(&defaults.customer_heading, customer, &date, defaults),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_parties_empty() {
        let block = signature_block(
            &PartyInfo::default(),
            &PartyInfo::default(),
            None,
            &SignatureDefaults::default(),
        );
        assert!(block.starts_with("<div class=\"signature-section\""));
        assert_eq!(block.matches("class=\"signature-party\"").count(), 2);
        assert_eq!(block.matches("Authorized Signatory").count(), 2);
        assert!(block.contains("<p>COUNTERPARTY</p>"));
        assert!(block.contains("<p>CUSTOMER</p>"));
        assert!(block.contains("Date: ____/____/______"));
    }

    #[test]
    fn test_party_values_and_date() {
        let counterparty = PartyInfo {
            company_name: "Acme & Sons".into(),
            contact_person: "J. Doe".into(),
            ..PartyInfo::default()
        };
        let customer = PartyInfo::named("Globex");
        let date = NaiveDate::from_ymd_opt(2026, 5, 4);
        let block = signature_block(&counterparty, &customer, date, &SignatureDefaults::default());

        assert!(block.contains("<p>Acme &amp; Sons</p>"));
        assert!(block.contains("<p>J. Doe</p>"));
        assert!(block.contains("<p>Globex</p>"));
        assert_eq!(block.matches("Date: 04.05.2026").count(), 2);

        let left = block.find("Acme").unwrap();
        let right = block.find("Globex").unwrap();
        assert!(left < right);
    }
}
