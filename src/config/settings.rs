//! Application settings loaded from config.toml
//!
//! Holds the default shipping country, the country picker options, and the catalog
//! items used to seed an empty store.

use crate::errors::{Error, Result};
use crate::models::{Category, DEFAULT_CONDITION};
use serde::Deserialize;
use std::path::Path;

/// Environment variable overriding the settings file location.
pub const CONFIG_PATH_VAR: &str = "DONATION_DESK_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Country used when a contact form leaves it empty
    #[serde(default = "default_country")]
    pub default_country: String,
    /// Countries offered in address forms
    #[serde(default = "default_countries")]
    pub countries: Vec<String>,
    /// Items inserted as available when the catalog is empty
    #[serde(default)]
    pub catalog: Vec<CatalogItemConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_country: default_country(),
            countries: default_countries(),
            catalog: Vec::new(),
        }
    }
}

/// One seeded catalog item
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogItemConfig {
    /// Item name
    pub name: String,
    /// Item description
    pub description: String,
    /// `book`, `pencil` or `school_supplies`
    pub category: Category,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default = "default_condition")]
    pub condition: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_country() -> String {
    "Sri Lanka".to_string()
}

fn default_countries() -> Vec<String> {
    [
        "Sri Lanka",
        "India",
        "United States",
        "United Kingdom",
        "Canada",
        "Australia",
        "Other",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const fn default_quantity() -> u32 {
    1
}

fn default_condition() -> String {
    DEFAULT_CONDITION.to_string()
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A catalog entry names an unknown category
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    tracing::debug!("Loading settings from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_config(&contents)
}

/// Parses settings from TOML text.
pub fn parse_config(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if settings.default_country.trim().is_empty() {
        return Err(Error::Config {
            message: "default_country cannot be empty".to_string(),
        });
    }
    if let Some(item) = settings.catalog.iter().find(|item| item.quantity == 0) {
        return Err(Error::Config {
            message: format!("Catalog item '{}' must have a positive quantity", item.name),
        });
    }

    Ok(settings)
}

/// Loads settings from `DONATION_DESK_CONFIG`, or ./config.toml.
///
/// A missing file is not an error; built-in defaults are used instead.
pub fn load_default_config() -> Result<Settings> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_config(&path)
    } else {
        tracing::info!("No settings file at {}, using defaults", path);
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
            default_country = "India"

            [[catalog]]
            name = "Math Textbook"
            description = "Grade 6 mathematics"
            category = "book"
            quantity = 4

            [[catalog]]
            name = "Pencil Box"
            description = "Twelve HB pencils"
            category = "pencil"
            condition = "New"
        "#;

        let settings = parse_config(toml_str).unwrap();
        assert_eq!(settings.default_country, "India");
        assert_eq!(settings.countries.len(), 7);
        assert_eq!(settings.catalog.len(), 2);
        assert_eq!(settings.catalog[0].category, Category::Book);
        assert_eq!(settings.catalog[0].condition, "Good");
        assert_eq!(settings.catalog[1].quantity, 1);
        assert_eq!(settings.catalog[1].condition, "New");
    }

    #[test]
    fn test_shipped_config_parses() {
        let settings = load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
        assert_eq!(settings.default_country, "Sri Lanka");
        assert_eq!(settings.catalog.len(), 4);
        assert_eq!(settings.catalog[2].category, Category::Pencil);
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = parse_config("").unwrap();
        assert_eq!(settings.default_country, "Sri Lanka");
        assert!(settings.catalog.is_empty());
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let toml_str = r#"
            [[catalog]]
            name = "Crayons"
            description = "Box of 24"
            category = "crayons"
        "#;
        assert!(matches!(
            parse_config(toml_str).unwrap_err(),
            Error::Config { .. }
        ));
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        let toml_str = r#"
            [[catalog]]
            name = "Ruler"
            description = "30cm"
            category = "pencil"
            quantity = 0
        "#;
        assert!(parse_config(toml_str).is_err());
    }
}
