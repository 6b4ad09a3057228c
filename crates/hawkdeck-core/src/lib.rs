//! Hawkdeck Core Library
//!
//! Core functionality for turning event analytics into a spreadsheet with
//! linked charts and a one-slide report deck on the remote document services.

pub mod config;
pub mod deck;
pub mod error;
pub mod google;
pub mod input;
pub mod sheet;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{Config, access_token};
pub use deck::build_deck;
pub use error::{DeckError, Result};
pub use google::{Session, presentation_url, spreadsheet_url};
pub use input::{load_events, load_seating, today};
pub use sheet::build_spreadsheet;
pub use types::{AnalyticsSample, AnalyticsSummary, EventRecord, SeatingSection, SpreadsheetHandle};
