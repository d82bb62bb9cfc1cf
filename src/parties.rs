//! Named parties and the manufacturer fallback group

use serde::{Deserialize, Serialize};

/// Identity of one contract party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartyInfo {
    pub company_name: String,
    pub address: String,
    pub contact_person: String,
    pub phone: String,
    pub email: String,
    pub tax_office: String,
    pub tax_number: String,
}

impl PartyInfo {
    pub fn named(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            ..Self::default()
        }
    }
}

/// Well-known placeholders filled from the counterparty record, not from field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedEntity {
    CompanyName,
    CompanyAddress,
    ContactPerson,
    CompanyPhone,
    CompanyEmail,
    TaxOffice,
    TaxNumber,
}

impl NamedEntity {
    pub const ALL: [NamedEntity; 7] = [
        NamedEntity::CompanyName,
        NamedEntity::CompanyAddress,
        NamedEntity::ContactPerson,
        NamedEntity::CompanyPhone,
        NamedEntity::CompanyEmail,
        NamedEntity::TaxOffice,
        NamedEntity::TaxNumber,
    ];

    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::CompanyName => "companyName",
            Self::CompanyAddress => "companyAddress",
            Self::ContactPerson => "contactPerson",
            Self::CompanyPhone => "companyPhone",
            Self::CompanyEmail => "companyEmail",
            Self::TaxOffice => "taxOffice",
            Self::TaxNumber => "taxNumber",
        }
    }

    pub fn from_placeholder(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.placeholder() == name)
    }

    pub fn value<'a>(&self, info: &'a PartyInfo) -> &'a str {
        match self {
            Self::CompanyName => &info.company_name,
            Self::CompanyAddress => &info.address,
            Self::ContactPerson => &info.contact_person,
            Self::CompanyPhone => &info.phone,
            Self::CompanyEmail => &info.email,
            Self::TaxOffice => &info.tax_office,
            Self::TaxNumber => &info.tax_number,
        }
    }
}

/// Flag that keeps the manufacturer placeholders under caller control.
pub const SEPARATE_SITE_FLAG: &str = "hasSeparateManufacturingSite";

pub const DEFAULT_MANUFACTURER_NAME: &str = "Quoteworks Contract Manufacturing Ltd.";
pub const DEFAULT_MANUFACTURER_ADDRESS: &str = "Organized Industrial Zone, 3rd Street No: 12";
pub const DEFAULT_MANUFACTURER_TAX_OFFICE: &str = "Industrial Zone Tax Office";
pub const DEFAULT_MANUFACTURER_TAX_NUMBER: &str = "1234567890";

/// Identity used for the manufacturer placeholders when no separate site exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManufacturerIdentity {
    pub name: String,
    pub address: String,
    pub tax_office: String,
    pub tax_number: String,
}

impl Default for ManufacturerIdentity {
    fn default() -> Self {
        Self {
            name: DEFAULT_MANUFACTURER_NAME.to_string(),
            address: DEFAULT_MANUFACTURER_ADDRESS.to_string(),
            tax_office: DEFAULT_MANUFACTURER_TAX_OFFICE.to_string(),
            tax_number: DEFAULT_MANUFACTURER_TAX_NUMBER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackField {
    ManufacturerName,
    ManufacturerAddress,
    ManufacturerTaxOffice,
    ManufacturerTaxNumber,
}

impl FallbackField {
    pub const ALL: [FallbackField; 4] = [
        FallbackField::ManufacturerName,
        FallbackField::ManufacturerAddress,
        FallbackField::ManufacturerTaxOffice,
        FallbackField::ManufacturerTaxNumber,
    ];

    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::ManufacturerName => "manufacturerName",
            Self::ManufacturerAddress => "manufacturerAddress",
            Self::ManufacturerTaxOffice => "manufacturerTaxOffice",
            Self::ManufacturerTaxNumber => "manufacturerTaxNumber",
        }
    }

    pub fn from_placeholder(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.placeholder() == name)
    }

    pub fn value<'a>(&self, identity: &'a ManufacturerIdentity) -> &'a str {
        match self {
            Self::ManufacturerName => &identity.name,
            Self::ManufacturerAddress => &identity.address,
            Self::ManufacturerTaxOffice => &identity.tax_office,
            Self::ManufacturerTaxNumber => &identity.tax_number,
        }
    }
}
