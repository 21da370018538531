// src/store.rs
use crate::backend::Backend;
use crate::datekey::IntoDateKey;
use crate::error::{StoreError, StoreResult};
use crate::models::{Entry, NewEntry};
use log;

pub const ENTRIES_KEY: &str = "junk-journal-entries";

/// Durable CRUD over the journal entries.
///
/// The whole collection lives in a single backend record. Every mutation reads
/// it, changes it and writes it back in one `Backend::write`, so there is never
/// a state where half an operation has been persisted.
#[derive(Debug)]
pub struct EntryStore<B: Backend> {
    backend: B,
}

impl<B: Backend> EntryStore<B> {
    pub fn new(backend: B) -> Self {
        EntryStore { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Reads the collection, treating an unreadable or corrupt record as empty.
    /// The next successful write replaces whatever was there.
    fn load(&self) -> Vec<Entry> {
        let raw = match self.backend.read(ENTRIES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Could not read entries, treating journal as empty: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Entry>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Stored entries are corrupt, treating journal as empty: {}", e);
                Vec::new()
            }
        }
    }

    fn persist(&mut self, entries: &[Entry]) -> StoreResult<()> {
        let serialized = serde_json::to_string(entries).map_err(|e| {
            let msg = format!("JSON serialization failed: {}", e);
            log::error!("persist: {}", msg);
            StoreError::Serialization(msg)
        })?;
        self.backend.write(ENTRIES_KEY, &serialized).map_err(|e| {
            log::error!("Failed to persist {} entries: {}", entries.len(), e);
            e
        })
    }

    /// Stores a new entry, generating its id if the caller left it out.
    ///
    /// A caller-supplied id that is already taken replaces that record rather
    /// than creating a second record with the same id.
    pub fn create(&mut self, new_entry: NewEntry) -> StoreResult<Entry> {
        let entry = new_entry.into_entry();
        let mut entries = self.load();
        match entries.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => {
                log::warn!("Entry id {} already exists; replacing it", entry.id);
                *existing = entry.clone();
            }
            None => entries.push(entry.clone()),
        }
        self.persist(&entries)?;
        log::info!("Created entry {} on {}", entry.id, entry.date);
        Ok(entry)
    }

    /// Replaces the record with the same id. An unknown id is inserted instead.
    pub fn update(&mut self, entry: Entry) -> StoreResult<Entry> {
        let mut entries = self.load();
        match entries.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => *existing = entry.clone(),
            None => {
                log::warn!("Update of unknown entry {}; inserting it instead", entry.id);
                entries.push(entry.clone());
            }
        }
        self.persist(&entries)?;
        log::info!("Updated entry {}", entry.id);
        Ok(entry)
    }

    /// Removes every record with `id` and returns how many went. Unknown ids are a no-op.
    pub fn delete(&mut self, id: &str) -> StoreResult<usize> {
        let mut entries = self.load();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = before - entries.len();
        if removed == 0 {
            log::info!("Delete of unknown entry {}; nothing to do", id);
            return Ok(0);
        }
        self.persist(&entries)?;
        log::info!("Deleted entry {}", id);
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<Entry> {
        self.load().into_iter().find(|entry| entry.id == id)
    }

    /// Entries filed under one day, in the order they were added.
    pub fn query_by_date(&self, date: impl IntoDateKey) -> Vec<Entry> {
        let key = date.into_date_key();
        self.load()
            .into_iter()
            .filter(|entry| entry.date == key)
            .collect()
    }

    pub fn has_entries_on(&self, date: impl IntoDateKey) -> bool {
        let key = date.into_date_key();
        self.load().iter().any(|entry| entry.date == key)
    }

    /// Entries whose day falls in `from..=to`.
    pub fn query_range(&self, from: impl IntoDateKey, to: impl IntoDateKey) -> Vec<Entry> {
        let from = from.into_date_key();
        let to = to.into_date_key();
        self.load()
            .into_iter()
            .filter(|entry| entry.date >= from && entry.date <= to)
            .collect()
    }

    /// A snapshot of every entry. Changing it does not touch the store.
    pub fn all(&self) -> Vec<Entry> {
        self.load()
    }

    pub fn clear(&mut self) -> StoreResult<()> {
        self.backend.remove(ENTRIES_KEY)?;
        log::info!("Cleared all entries");
        Ok(())
    }
}
