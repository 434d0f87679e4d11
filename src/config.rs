use crate::error::{BillReportError, Result};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Language used for month names on the trend axis and service-type labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LabelLocale {
    #[schemars(description = "English labels (Jan, Feb, ... / Electricity, Water, ...)")]
    En,

    #[schemars(description = "Spanish labels (Ene, Feb, ... / Electricidad, Agua, ...)")]
    Es,
}

impl Default for LabelLocale {
    fn default() -> Self {
        Self::En
    }
}

impl FromStr for LabelLocale {
    type Err = BillReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(LabelLocale::En),
            "es" | "es-es" | "es-mx" | "es-ar" => Ok(LabelLocale::Es),
            other => Err(BillReportError::InvalidLocale(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReportConfig {
    #[schemars(description = "Locale for month and service-type labels. Defaults to English.")]
    pub locale: LabelLocale,

    #[schemars(
        description = "Year offered by year pickers when no bills exist. Defaults to the clock's current year."
    )]
    pub fallback_year: Option<i32>,
}

impl ReportConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.validate()?;
        debug!("Loaded report config: {:?}", config);
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(year) = self.fallback_year {
            if !(0..=9999).contains(&year) {
                return Err(BillReportError::ValidationError {
                    bill: "<config>".to_string(),
                    details: format!("fallback_year {} must have four digits", year),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = ReportConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.locale, LabelLocale::En);
    }

    #[test]
    fn test_parse_locale_and_fallback_year() {
        let config =
            ReportConfig::from_json_str(r#"{"locale": "es", "fallback_year": 2023}"#).unwrap();
        assert_eq!(config.locale, LabelLocale::Es);
        assert_eq!(config.fallback_year, Some(2023));
    }

    #[test]
    fn test_rejects_out_of_range_fallback_year() {
        let result = ReportConfig::from_json_str(r#"{"fallback_year": 12345}"#);
        assert!(matches!(
            result,
            Err(BillReportError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_locale() {
        assert!(ReportConfig::from_json_str(r#"{"locale": "fr"}"#).is_err());
        assert!(matches!(
            "fr".parse::<LabelLocale>(),
            Err(BillReportError::InvalidLocale(_))
        ));
        assert_eq!("ES-mx".parse::<LabelLocale>().unwrap(), LabelLocale::Es);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ReportConfig::from_json_file("/nonexistent/report-config.json");
        assert!(matches!(result, Err(BillReportError::IoError(_))));
    }
}
