use std::path::Path;

use tokio::fs;

use crate::{
    error::Result,
    types::{EventFeed, EventRecord, SeatingFile, SeatingSection},
};

/// Load the event feed. Missing or malformed input is fatal for the run.
pub async fn load_events(path: &Path) -> Result<Vec<EventRecord>> {
    let contents = fs::read_to_string(path).await?;
    let feed: EventFeed = serde_json::from_str(&contents)?;
    Ok(feed.data)
}

/// Load seating sections. An absent or unparseable file is the same as no
/// seating data; the spreadsheet builder falls back to placeholders.
pub async fn load_seating(path: &Path) -> Option<Vec<SeatingSection>> {
    let contents = fs::read_to_string(path).await.ok()?;
    let file: SeatingFile = serde_json::from_str(&contents).ok()?;
    Some(file.sections.into_iter().map(Into::into).collect())
}

/// Today's local calendar date as the ISO string the selection rule compares
/// against.
pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
