// src/lib.rs
//! A local food-spending journal.
//!
//! [`store::EntryStore`] keeps the entries in a keyed [`backend::Backend`];
//! [`stats`] turns a snapshot of them into monthly totals, per-food breakdowns
//! and streaks.

pub mod backend;
pub mod cli;
pub mod config;
pub mod datekey;
pub mod error;
pub mod image;
pub mod models;
pub mod stats;
pub mod store;
pub mod suggestions;
pub mod validation;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use error::{AppError, AppResult, StoreError, StoreResult};
pub use models::{Entry, NewEntry};
pub use store::EntryStore;
pub use suggestions::FoodSuggestions;
