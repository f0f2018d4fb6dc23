use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Postal code used when the caller does not supply one.
pub const DEFAULT_ZIP_CODE: &str = "05100";
/// Engine description used when the caller does not supply one.
pub const DEFAULT_ENGINE: &str = "L4 2.0T";
/// Door count description used when the caller does not supply one.
pub const DEFAULT_DOORS: &str = "5 puertas";

/// The vehicle a quote is requested for.
///
/// `brand`, `model` and `year` are required and must contain more than
/// whitespace. The optional attributes fall back to the `DEFAULT_*` values
/// when absent or empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vehicle {
    pub brand: String,
    pub model: String,
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doors: Option<String>,
}

impl Vehicle {
    pub fn new(
        brand: impl Into<String>,
        model: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
            year: year.into(),
            ..Default::default()
        }
    }

    pub fn with_zip_code(mut self, zip_code: impl Into<String>) -> Self {
        self.zip_code = Some(zip_code.into());
        self
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn with_doors(mut self, doors: impl Into<String>) -> Self {
        self.doors = Some(doors.into());
        self
    }

    /// Check that every required field is present.
    ///
    /// Fields are checked in declaration order so the reported field is stable.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("brand", &self.brand),
            ("model", &self.model),
            ("year", &self.year),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::MissingField(name));
            }
        }
        Ok(())
    }

    pub fn zip_code_or_default(&self) -> &str {
        non_empty(self.zip_code.as_deref()).unwrap_or(DEFAULT_ZIP_CODE)
    }

    pub fn engine_or_default(&self) -> &str {
        non_empty(self.engine.as_deref()).unwrap_or(DEFAULT_ENGINE)
    }

    pub fn doors_or_default(&self) -> &str {
        non_empty(self.doors.as_deref()).unwrap_or(DEFAULT_DOORS)
    }

    /// Text typed into the portal's vehicle search box.
    pub fn search_query(&self) -> String {
        format!("{} {} {}", self.brand, self.model, self.year)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
