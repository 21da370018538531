// src/models.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::datekey::IntoDateKey;

/// One recorded food purchase.
///
/// `amount` is kept as the raw JSON value it was stored with. Older records can
/// carry strings or nothing at all there; use `stats::parse_amount` to read it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub date: String,
    pub food_name: String,
    #[serde(default)]
    pub amount: Value,
    #[serde(default)]
    pub image: Option<String>,
}

impl Entry {
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|image| !image.is_empty())
    }
}

/// Creation payload: an `Entry` whose id may still be unassigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub id: Option<String>,
    pub date: String,
    pub food_name: String,
    pub amount: Value,
    pub image: Option<String>,
}

impl NewEntry {
    pub fn new(date: impl IntoDateKey, food_name: impl Into<String>, amount: f64) -> Self {
        Self {
            id: None,
            date: date.into_date_key(),
            food_name: food_name.into(),
            amount: Value::from(amount),
            image: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Turns the payload into a stored record, generating an id when none was given.
    pub fn into_entry(self) -> Entry {
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };
        Entry {
            id,
            date: self.date,
            food_name: self.food_name,
            amount: self.amount,
            image: self.image.filter(|image| !image.is_empty()),
        }
    }
}

impl From<Entry> for NewEntry {
    fn from(entry: Entry) -> Self {
        Self {
            id: Some(entry.id),
            date: entry.date,
            food_name: entry.food_name,
            amount: entry.amount,
            image: entry.image,
        }
    }
}
