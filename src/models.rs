//! Request/response models for the tutorial API.

use serde::{Deserialize, Deserializer, Serialize};

/// Catalogue item. `id` is assigned by the store; any id sent by a client is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub is_offer: Option<bool>,
}

impl Item {
    pub fn new(name: &str, price: f64, is_offer: Option<bool>) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            price,
            is_offer,
        }
    }

    pub(crate) fn with_id(&self, id: i64) -> Self {
        Self {
            id: Some(id),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl User {
    pub fn new(username: &str, email: &str, full_name: Option<&str>) -> Self {
        Self {
            id: None,
            username: username.to_string(),
            email: email.to_string(),
            full_name: full_name.map(str::to_string),
        }
    }

    pub(crate) fn with_id(&self, id: i64) -> Self {
        Self {
            id: Some(id),
            ..self.clone()
        }
    }
}

/// Item search filters (all optional, combined with AND)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Case-insensitive substring; empty string is ignored
    pub name: Option<String>,
    /// Inclusive lower bound
    #[serde(default, deserialize_with = "empty_as_none")]
    pub price_min: Option<f64>,
    /// Inclusive upper bound
    #[serde(default, deserialize_with = "empty_as_none")]
    pub price_max: Option<f64>,
}

/// `?price_min=` means no bound; anything else must parse as a number.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid number: {}", value))),
    }
}
