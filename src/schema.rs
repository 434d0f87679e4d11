use crate::config::LabelLocale;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    #[schemars(description = "Electric power supply")]
    Electricity,

    #[schemars(description = "Drinking water supply")]
    Water,

    #[schemars(description = "Natural gas or LPG supply")]
    Gas,

    #[schemars(description = "Fixed broadband / internet access")]
    Internet,

    #[schemars(description = "Fixed-line telephony")]
    Phone,

    #[schemars(description = "Mobile telephony plans")]
    Cellular,

    #[schemars(description = "Garbage collection and waste disposal")]
    Waste,

    #[schemars(description = "Sewerage and drainage")]
    Sewer,

    #[schemars(description = "Guarding, alarm monitoring and surveillance")]
    Security,

    #[schemars(description = "Building administration / common expenses")]
    Administration,

    #[schemars(description = "Premises rent")]
    Rent,

    #[schemars(description = "Municipal public lighting levy")]
    PublicLighting,

    #[schemars(description = "Any service not covered by the other categories")]
    Other,
}

impl ServiceType {
    /// Canonical order. Category breakdowns always follow it.
    pub const ALL: [ServiceType; 13] = [
        ServiceType::Electricity,
        ServiceType::Water,
        ServiceType::Gas,
        ServiceType::Internet,
        ServiceType::Phone,
        ServiceType::Cellular,
        ServiceType::Waste,
        ServiceType::Sewer,
        ServiceType::Security,
        ServiceType::Administration,
        ServiceType::Rent,
        ServiceType::PublicLighting,
        ServiceType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Electricity => "electricity",
            ServiceType::Water => "water",
            ServiceType::Gas => "gas",
            ServiceType::Internet => "internet",
            ServiceType::Phone => "phone",
            ServiceType::Cellular => "cellular",
            ServiceType::Waste => "waste",
            ServiceType::Sewer => "sewer",
            ServiceType::Security => "security",
            ServiceType::Administration => "administration",
            ServiceType::Rent => "rent",
            ServiceType::PublicLighting => "public_lighting",
            ServiceType::Other => "other",
        }
    }

    /// Human readable label used as the breakdown key.
    pub fn label(&self, locale: LabelLocale) -> &'static str {
        match locale {
            LabelLocale::En => match self {
                ServiceType::Electricity => "Electricity",
                ServiceType::Water => "Water",
                ServiceType::Gas => "Gas",
                ServiceType::Internet => "Internet",
                ServiceType::Phone => "Phone",
                ServiceType::Cellular => "Cellular",
                ServiceType::Waste => "Waste",
                ServiceType::Sewer => "Sewer",
                ServiceType::Security => "Security",
                ServiceType::Administration => "Administration",
                ServiceType::Rent => "Rent",
                ServiceType::PublicLighting => "Public Lighting",
                ServiceType::Other => "Other",
            },
            LabelLocale::Es => match self {
                ServiceType::Electricity => "Electricidad",
                ServiceType::Water => "Agua",
                ServiceType::Gas => "Gas",
                ServiceType::Internet => "Internet",
                ServiceType::Phone => "Teléfono",
                ServiceType::Cellular => "Celular",
                ServiceType::Waste => "Residuos",
                ServiceType::Sewer => "Alcantarillado",
                ServiceType::Security => "Seguridad",
                ServiceType::Administration => "Administración",
                ServiceType::Rent => "Arriendo",
                ServiceType::PublicLighting => "Alumbrado Público",
                ServiceType::Other => "Otros",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    #[schemars(description = "Saved but not yet submitted for approval")]
    Draft,

    #[schemars(description = "Submitted and awaiting approval. The only status that can count as overdue.")]
    Pending,

    #[schemars(description = "Approved for payment")]
    Approved,

    #[schemars(description = "Explicitly flagged as overdue by a reviewer")]
    Overdue,

    #[schemars(description = "Settled")]
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BillRecord {
    #[schemars(description = "Opaque identifier assigned by the storage layer")]
    pub id: String,

    #[schemars(
        description = "Reporting period in YYYY-MM format. Not necessarily the consumption dates printed on the bill."
    )]
    pub period: String,

    #[schemars(description = "The kind of service billed")]
    pub service_type: ServiceType,

    #[schemars(description = "Site or cost-center the bill belongs to (free text)")]
    pub location: String,

    #[schemars(description = "Approval workflow status")]
    pub status: BillStatus,

    #[schemars(
        description = "Total amount payable. Non-negative, whole currency units (no fractional cents are displayed)."
    )]
    pub total_amount: f64,

    #[schemars(description = "Payment due date in YYYY-MM-DD format")]
    pub due_date: NaiveDate,
}

impl BillRecord {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Vec<BillRecord>)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    /// The first four characters of the period, i.e. the year key.
    pub fn year_key(&self) -> Option<&str> {
        self.period.get(..4)
    }
}
