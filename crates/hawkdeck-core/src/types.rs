use serde::Deserialize;

/// Top-level shape of the event feed file.
#[derive(Debug, Deserialize)]
pub struct EventFeed {
    pub data: Vec<EventRecord>,
}

/// One monitored event as exported by the analytics backend. Read-only input.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    #[serde(default = "untitled")]
    pub event_title: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub repeat_type: String,
    #[serde(default)]
    pub duration_hours: f64,
    #[serde(default)]
    pub inference_types: Vec<String>,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub analytics: Vec<AnalyticsSample>,
    #[serde(default)]
    pub analytics_summary: AnalyticsSummary,
    /// Logo image URL; the deck skips the logo entirely when absent.
    #[serde(default)]
    pub latest_image_url_id: Option<String>,
}

fn untitled() -> String {
    "Untitled".to_string()
}

impl EventRecord {
    /// An event is due when its end date, compared as a literal ISO date
    /// string, equals the given date.
    pub fn is_due(&self, today: &str) -> bool {
        self.end_date == today
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub device_name: String,
}

/// One headcount sample, timestamped with an ISO datetime string.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsSample {
    #[serde(default)]
    pub datetime: String,
    #[serde(default)]
    pub headcount: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub average_count: i64,
    #[serde(default)]
    pub max_count: i64,
}

/// One seating section with its most recent weekly density, flattened from
/// the seating side file.
#[derive(Debug, Clone)]
pub struct SeatingSection {
    pub section_name: String,
    pub weekly_density: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeatingFile {
    #[serde(default)]
    pub sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSection {
    #[serde(default = "unknown")]
    pub section_name: String,
    #[serde(default)]
    pub weekly_data: WeeklyData,
}

fn unknown() -> String {
    "Unknown".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WeeklyData {
    #[serde(default)]
    pub last_week: LastWeek,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LastWeek {
    #[serde(default)]
    pub seating_density: f64,
}

impl From<RawSection> for SeatingSection {
    fn from(raw: RawSection) -> Self {
        SeatingSection {
            section_name: raw.section_name,
            weekly_density: raw.weekly_data.last_week.seating_density,
        }
    }
}

/// Ids resolved from the spreadsheet service, consumed by the deck builder.
#[derive(Debug, Clone)]
pub struct SpreadsheetHandle {
    pub spreadsheet_id: String,
    pub chart_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_record_parses_with_defaults() {
        let event: EventRecord = serde_json::from_str(r#"{"event_title": "Expo"}"#).unwrap();
        assert_eq!(event.event_title, "Expo");
        assert!(event.analytics.is_empty());
        assert_eq!(event.analytics_summary.max_count, 0);
        assert!(event.latest_image_url_id.is_none());
    }

    #[test]
    fn due_matches_literal_end_date_only() {
        let event: EventRecord =
            serde_json::from_str(r#"{"event_title": "Demo", "end_date": "2024-05-01"}"#).unwrap();
        assert!(event.is_due("2024-05-01"));
        assert!(!event.is_due("2024-05-02"));
    }

    #[test]
    fn only_events_ending_today_are_selected() {
        let feed: EventFeed = serde_json::from_str(
            r#"{"data": [
                {"event_title": "Due", "end_date": "2024-05-01"},
                {"event_title": "Past", "end_date": "2024-04-30"},
                {"event_title": "Future", "end_date": "2024-05-02"}
            ]}"#,
        )
        .unwrap();
        let due: Vec<_> = feed.data.iter().filter(|e| e.is_due("2024-05-01")).collect();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].event_title, "Due");
    }

    #[test]
    fn seating_section_flattens_last_week_density() {
        let file: SeatingFile = serde_json::from_str(
            r#"{"sections": [{"section_name": "North Stand",
                "weekly_data": {"last_week": {"seating_density": 0.72}}}]}"#,
        )
        .unwrap();
        let sections: Vec<SeatingSection> = file.sections.into_iter().map(Into::into).collect();
        assert_eq!(sections[0].section_name, "North Stand");
        assert_eq!(sections[0].weekly_density, 0.72);
    }
}
