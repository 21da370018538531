// src/suggestions.rs
use crate::backend::Backend;
use crate::error::{StoreError, StoreResult};
use log;

pub const FOOD_SUGGESTIONS_KEY: &str = "junk-journal-food-suggestions";

/// Previously used food names, deduplicated without regard to case.
/// The first spelling of a name is the one that is kept.
#[derive(Debug)]
pub struct FoodSuggestions<B: Backend> {
    backend: B,
}

impl<B: Backend> FoodSuggestions<B> {
    pub fn new(backend: B) -> Self {
        FoodSuggestions { backend }
    }

    /// All suggestions in the order they were first used. Unreadable data reads as empty.
    pub fn list(&self) -> Vec<String> {
        let raw = match self.backend.read(FOOD_SUGGESTIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Could not read food suggestions: {}", e);
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Stored food suggestions are corrupt, ignoring them: {}", e);
            Vec::new()
        })
    }

    /// Records `food_name` unless it is blank or already known in any casing.
    /// Returns the suggestion list as it stands afterwards.
    pub fn add(&mut self, food_name: &str) -> StoreResult<Vec<String>> {
        let mut suggestions = self.list();
        let trimmed = food_name.trim();
        if trimmed.is_empty() || contains_ignore_case(&suggestions, trimmed) {
            return Ok(suggestions);
        }

        suggestions.push(trimmed.to_string());
        let serialized = serde_json::to_string(&suggestions)
            .map_err(|e| StoreError::Serialization(format!("JSON serialization failed: {}", e)))?;
        self.backend.write(FOOD_SUGGESTIONS_KEY, &serialized)?;
        log::info!("Added food suggestion '{}'", trimmed);
        Ok(suggestions)
    }

    /// Suggestions whose name starts with `prefix`, case-insensitively.
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.trim().to_lowercase();
        self.list()
            .into_iter()
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .collect()
    }
}

fn contains_ignore_case(names: &[String], candidate: &str) -> bool {
    let candidate = candidate.to_lowercase();
    names.iter().any(|name| name.to_lowercase() == candidate)
}
