//! Company models

use serde::{Deserialize, Serialize};

/// Payload accepted by `POST /companies`
///
/// All four fields are required. The record is persisted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCreate {
    /// Unique company key
    pub company_id: String,
    /// Display name
    pub name: String,
    /// Short alias used in chat records
    pub alias: String,
    /// Company phone number
    pub phone: String,
}

impl CompanyCreate {
    /// Validate the payload
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.company_id.trim().is_empty() {
            return Err("companyId cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Company as returned by `GET /companies`
///
/// `alias` and `phone` are optional so that documents written by other
/// tools still list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Unique company key
    #[serde(default)]
    pub company_id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Short alias
    #[serde(default)]
    pub alias: Option<String>,
    /// Company phone number
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<CompanyCreate> for Company {
    fn from(company: CompanyCreate) -> Self {
        Self {
            company_id: company.company_id,
            name: company.name,
            alias: Some(company.alias),
            phone: Some(company.phone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> CompanyCreate {
        CompanyCreate {
            company_id: "C1".to_string(),
            name: "Acme".to_string(),
            alias: "acme".to_string(),
            phone: "+1".to_string(),
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(acme().validate().is_ok());
    }

    #[test]
    fn test_validate_blank_company_id() {
        let mut company = acme();
        company.company_id = "  ".to_string();
        assert!(company.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_empty_name() {
        let mut company = acme();
        company.name = String::new();
        company.alias = String::new();
        assert!(company.validate().is_ok());
    }

    #[test]
    fn test_create_requires_every_field() {
        let result: Result<CompanyCreate, _> =
            serde_json::from_str(r#"{"companyId":"C1","name":"Acme","alias":"acme"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_company_tolerates_missing_optional_fields() {
        let company: Company = serde_json::from_str(r#"{"companyId":"C1","name":"Acme"}"#).unwrap();
        assert_eq!(company.alias, None);
        assert_eq!(company.phone, None);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json = serde_json::to_value(Company::from(acme())).unwrap();
        assert_eq!(json["companyId"], "C1");
        assert_eq!(json["alias"], "acme");
    }
}
