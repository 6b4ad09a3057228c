//! Spreadsheet builder: writes trend and seat-density tables for one event,
//! then creates the charts the deck will embed.
//!
//! Chart creation references the numeric tab ids the service assigns, which
//! the create call does not return. Two metadata read-backs are therefore
//! part of the contract: one to resolve tab ids before adding charts, one to
//! resolve the chart ids afterwards.

use serde_json::{Value, json};

use crate::{
    error::{DeckError, Result},
    google::Session,
    types::{AnalyticsSample, EventRecord, SeatingSection, SpreadsheetHandle},
};

pub const TREND_TAB: &str = "TrendData";
pub const SEAT_TAB: &str = "SeatData";

/// Fixed series written when an event carries no analytics samples.
const TREND_PLACEHOLDER: [(&str, i64); 7] = [
    ("8:00", 25),
    ("10:00", 40),
    ("12:00", 35),
    ("14:00", 30),
    ("16:00", 38),
    ("18:00", 35),
    ("20:00", 20),
];

/// Fixed densities written when no seating data is available.
const SEAT_PLACEHOLDER: [(&str, f64); 5] = [
    ("Section 1", -1.0),
    ("Section 2", -0.5),
    ("Section 3", 0.0),
    ("Section 4", 0.5),
    ("Section 5", 1.0),
];

/// Map analytics samples to (HH:MM, headcount) rows. The placeholder series
/// only stands in for an empty sequence; a sample with a broken timestamp is
/// a data error, not something to paper over.
pub fn trend_rows(analytics: &[AnalyticsSample]) -> Result<Vec<(String, i64)>> {
    if analytics.is_empty() {
        return Ok(TREND_PLACEHOLDER
            .iter()
            .map(|(time, count)| (time.to_string(), *count))
            .collect());
    }
    analytics
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            let time = sample
                .datetime
                .split_once('T')
                .and_then(|(_, time)| time.get(..5))
                .ok_or_else(|| DeckError::MalformedSample {
                    index,
                    datetime: sample.datetime.clone(),
                })?;
            Ok((time.to_string(), sample.headcount))
        })
        .collect()
}

/// Seat-density rows, falling back to the placeholder table when the seating
/// source is absent or empty.
pub fn seat_rows(seating: Option<&[SeatingSection]>) -> Vec<(String, f64)> {
    match seating {
        Some(sections) if !sections.is_empty() => sections
            .iter()
            .map(|s| (s.section_name.clone(), s.weekly_density))
            .collect(),
        _ => SEAT_PLACEHOLDER
            .iter()
            .map(|(name, density)| (name.to_string(), *density))
            .collect(),
    }
}

/// A1 range covering a header row plus `data_len` data rows in columns A:B.
pub fn data_range(tab: &str, data_len: usize) -> String {
    format!("{tab}!A1:B{}", data_len + 1)
}

fn source_range(tab_id: i64, data_len: usize, column: u32) -> Value {
    json!({"sources": [{
        "sheetId": tab_id,
        "startRowIndex": 1,
        "endRowIndex": data_len + 1,
        "startColumnIndex": column,
        "endColumnIndex": column + 1,
    }]})
}

fn anchor(tab_id: i64) -> Value {
    json!({"overlayPosition": {"anchorCell": {
        "sheetId": tab_id,
        "rowIndex": 0,
        "columnIndex": 3,
    }}})
}

/// Smoothed line chart over the trend tab's count column.
pub fn trend_chart_request(tab_id: i64, data_len: usize) -> Value {
    json!({"addChart": {"chart": {
        "spec": {
            "title": "Crowd Trend Analysis",
            "basicChart": {
                "chartType": "LINE",
                "legendPosition": "NO_LEGEND",
                "axis": [
                    {"position": "BOTTOM_AXIS", "title": ""},
                    {"position": "LEFT_AXIS", "title": ""},
                ],
                "lineSmoothing": true,
                "series": [{
                    "series": {"sourceRange": source_range(tab_id, data_len, 1)},
                    "color": {"red": 0.3, "green": 0.5, "blue": 0.9},
                    "lineStyle": {"width": 2},
                }],
                "domains": [{"domain": {
                    "sourceRange": source_range(tab_id, data_len, 0),
                }}],
            },
        },
        "position": anchor(tab_id),
    }}})
}

/// Column chart over the seat tab's density column.
pub fn seat_chart_request(tab_id: i64, data_len: usize) -> Value {
    json!({"addChart": {"chart": {
        "spec": {
            "title": "Seat Sections",
            "basicChart": {
                "chartType": "COLUMN",
                "legendPosition": "NO_LEGEND",
                "axis": [
                    {"position": "BOTTOM_AXIS", "title": "Section 1"},
                    {"position": "LEFT_AXIS", "title": ""},
                ],
                "series": [{
                    "series": {"sourceRange": source_range(tab_id, data_len, 1)},
                    "color": {"red": 0.1, "green": 0.3, "blue": 0.6},
                    "targetAxis": "LEFT_AXIS",
                }],
                "domains": [{"domain": {
                    "sourceRange": source_range(tab_id, data_len, 0),
                }}],
            },
        },
        "position": anchor(tab_id),
    }}})
}

/// Numeric id of a named tab, from spreadsheet metadata.
pub fn tab_id(metadata: &Value, tab: &str) -> Result<i64> {
    metadata["sheets"]
        .as_array()
        .into_iter()
        .flatten()
        .find(|sheet| sheet["properties"]["title"] == tab)
        .and_then(|sheet| sheet["properties"]["sheetId"].as_i64())
        .ok_or_else(|| DeckError::TabNotFound {
            tab: tab.to_string(),
        })
}

/// Chart ids in tab order, which matches request order since each tab holds
/// exactly one chart. Coming up short means the batch did not apply the way
/// we asked; guessing ids here would wire the wrong chart into the deck.
pub fn resolve_chart_ids(metadata: &Value, requested: usize) -> Result<Vec<i64>> {
    let ids: Vec<i64> = metadata["sheets"]
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|sheet| sheet["charts"].as_array().into_iter().flatten())
        .filter_map(|chart| chart["chartId"].as_i64())
        .collect();
    if ids.len() < requested {
        return Err(DeckError::ChartResolution {
            requested,
            found: ids.len(),
        });
    }
    Ok(ids)
}

fn value_rows(header: [&str; 2], rows: Vec<(String, Value)>) -> Value {
    let mut out = vec![json!([header[0], header[1]])];
    out.extend(rows.into_iter().map(|(label, value)| json!([label, value])));
    Value::Array(out)
}

/// Create the spreadsheet for one event: two tabs, trend and seat tables,
/// one chart per tab. Returns the spreadsheet id and the chart ids in
/// request order (trend first).
pub async fn build_spreadsheet(
    session: &Session,
    event: &EventRecord,
    seating: Option<&[SeatingSection]>,
) -> Result<SpreadsheetHandle> {
    let short_title: String = event.event_title.chars().take(30).collect();
    let created = session
        .create_spreadsheet(&format!("{short_title} Sheet"), &[TREND_TAB, SEAT_TAB])
        .await?;
    let spreadsheet_id = created["spreadsheetId"]
        .as_str()
        .ok_or(DeckError::MissingField {
            field: "spreadsheetId",
        })?
        .to_string();

    let trend = trend_rows(&event.analytics)?;
    let seats = seat_rows(seating);

    session
        .update_values(
            &spreadsheet_id,
            &data_range(TREND_TAB, trend.len()),
            value_rows(
                ["Time", "Count"],
                trend
                    .iter()
                    .map(|(time, count)| (time.clone(), json!(count)))
                    .collect(),
            ),
        )
        .await?;
    session
        .update_values(
            &spreadsheet_id,
            &data_range(SEAT_TAB, seats.len()),
            value_rows(
                ["Section", "Density"],
                seats
                    .iter()
                    .map(|(name, density)| (name.clone(), json!(density)))
                    .collect(),
            ),
        )
        .await?;

    // The create call never returns numeric tab ids; read them back before
    // any chart request can reference them.
    let metadata = session.get_spreadsheet(&spreadsheet_id).await?;
    let trend_tab = tab_id(&metadata, TREND_TAB)?;
    let seat_tab = tab_id(&metadata, SEAT_TAB)?;

    let requests = vec![
        trend_chart_request(trend_tab, trend.len()),
        seat_chart_request(seat_tab, seats.len()),
    ];
    let requested = requests.len();
    session
        .sheets_batch_update(&spreadsheet_id, requests)
        .await?;

    let metadata = session.get_spreadsheet(&spreadsheet_id).await?;
    let chart_ids = resolve_chart_ids(&metadata, requested)?;

    Ok(SpreadsheetHandle {
        spreadsheet_id,
        chart_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(datetime: &str, headcount: i64) -> AnalyticsSample {
        AnalyticsSample {
            datetime: datetime.to_string(),
            headcount,
        }
    }

    #[test]
    fn trend_rows_extract_hh_mm_per_sample() {
        let analytics = vec![
            sample("2024-05-01T08:30:00", 12),
            sample("2024-05-01T09:15:00", 31),
        ];
        let rows = trend_rows(&analytics).unwrap();
        assert_eq!(rows.len(), analytics.len());
        assert_eq!(rows[0], ("08:30".to_string(), 12));
        assert_eq!(rows[1], ("09:15".to_string(), 31));
    }

    #[test]
    fn empty_analytics_fall_back_to_seven_placeholder_rows() {
        let rows = trend_rows(&[]).unwrap();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0], ("8:00".to_string(), 25));
        assert_eq!(rows[6], ("20:00".to_string(), 20));
    }

    #[test]
    fn malformed_sample_is_an_error_not_a_fallback() {
        let analytics = vec![sample("2024-05-01T08:30:00", 12), sample("not-a-date", 5)];
        let err = trend_rows(&analytics).unwrap_err();
        assert!(matches!(
            err,
            DeckError::MalformedSample { index: 1, .. }
        ));
    }

    #[test]
    fn data_range_ends_one_past_the_data_rows() {
        assert_eq!(data_range(TREND_TAB, 0), "TrendData!A1:B1");
        assert_eq!(data_range(TREND_TAB, 1), "TrendData!A1:B2");
        assert_eq!(data_range(SEAT_TAB, 41), "SeatData!A1:B42");
    }

    #[test]
    fn seat_rows_fall_back_when_absent_or_empty() {
        assert_eq!(seat_rows(None).len(), 5);
        assert_eq!(seat_rows(Some(&[])).len(), 5);
        let sections = vec![SeatingSection {
            section_name: "East".to_string(),
            weekly_density: 0.4,
        }];
        let rows = seat_rows(Some(&sections));
        assert_eq!(rows, vec![("East".to_string(), 0.4)]);
    }

    #[test]
    fn chart_requests_embed_the_resolved_tab_id() {
        let req = trend_chart_request(4711, 7);
        let chart = &req["addChart"]["chart"];
        let series_source =
            &chart["spec"]["basicChart"]["series"][0]["series"]["sourceRange"]["sources"][0];
        assert_eq!(series_source["sheetId"], 4711);
        assert_eq!(series_source["endRowIndex"], 8);
        let domain_source =
            &chart["spec"]["basicChart"]["domains"][0]["domain"]["sourceRange"]["sources"][0];
        assert_eq!(domain_source["sheetId"], 4711);
        assert_eq!(
            chart["position"]["overlayPosition"]["anchorCell"]["sheetId"],
            4711
        );

        let req = seat_chart_request(93, 5);
        let source =
            &req["addChart"]["chart"]["spec"]["basicChart"]["series"][0]["series"]["sourceRange"]
                ["sources"][0];
        assert_eq!(source["sheetId"], 93);
        assert_eq!(source["endRowIndex"], 6);
    }

    #[test]
    fn tab_ids_resolve_from_metadata_by_title() {
        let metadata = serde_json::json!({"sheets": [
            {"properties": {"title": "TrendData", "sheetId": 0}},
            {"properties": {"title": "SeatData", "sheetId": 170981142}},
        ]});
        assert_eq!(tab_id(&metadata, TREND_TAB).unwrap(), 0);
        assert_eq!(tab_id(&metadata, SEAT_TAB).unwrap(), 170981142);
        assert!(matches!(
            tab_id(&metadata, "Other").unwrap_err(),
            DeckError::TabNotFound { .. }
        ));
    }

    #[test]
    fn missing_chart_ids_are_a_hard_error() {
        let metadata = serde_json::json!({"sheets": [
            {"properties": {"title": "TrendData"}, "charts": [{"chartId": 111}]},
            {"properties": {"title": "SeatData"}},
        ]});
        let err = resolve_chart_ids(&metadata, 2).unwrap_err();
        assert!(matches!(
            err,
            DeckError::ChartResolution {
                requested: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn chart_ids_come_back_in_tab_order() {
        let metadata = serde_json::json!({"sheets": [
            {"charts": [{"chartId": 314}]},
            {"charts": [{"chartId": 159}]},
        ]});
        assert_eq!(resolve_chart_ids(&metadata, 2).unwrap(), vec![314, 159]);
    }
}
