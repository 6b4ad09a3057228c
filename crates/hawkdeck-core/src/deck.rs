//! Deck builder: copies the template presentation and fills one slide with a
//! title, an event details table, KPI cards and the linked spreadsheet
//! charts, all through a single ordered batch of operations.
//!
//! The batch is ordered so that every operation referencing an object id
//! comes after the operation creating that id. That ordering is the one
//! invariant the remote service will not repair for us.

use std::hash::{DefaultHasher, Hash, Hasher};

use serde_json::{Value, json};

use crate::{
    config::Config,
    error::Result,
    google::Session,
    types::{AnalyticsSummary, EventRecord},
};

const TITLE_TEXT: &str = "EVENT REPORT";
const DECK_NAME_PREFIX: &str = "HawkEye Report";

/// Stable element id for one role within one event. Hashing the full title
/// keeps ids reproducible across runs of the same event while distinct
/// titles (including ones sharing a long prefix) get distinct ids.
pub fn element_id(event_title: &str, role: &str) -> String {
    let mut hasher = DefaultHasher::new();
    event_title.hash(&mut hasher);
    format!("{role}_{:016x}", hasher.finish())
}

fn rgb(red: f64, green: f64, blue: f64) -> Value {
    json!({"red": red, "green": green, "blue": blue})
}

fn pt(magnitude: f64) -> Value {
    json!({"magnitude": magnitude, "unit": "PT"})
}

fn transform(translate_x: f64, translate_y: f64) -> Value {
    json!({
        "scaleX": 1, "scaleY": 1,
        "translateX": translate_x, "translateY": translate_y,
        "unit": "PT",
    })
}

fn element_properties(slide_id: &str, x: f64, y: f64, width: f64, height: f64) -> Value {
    json!({
        "pageObjectId": slide_id,
        "transform": transform(x, y),
        "size": {"width": pt(width), "height": pt(height)},
    })
}

/// One KPI callout, positioned by an anchor the sub-elements offset from.
#[derive(Debug, Clone)]
pub struct KpiCard {
    pub id: String,
    pub title: &'static str,
    pub value: String,
    pub change: &'static str,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub background: (f64, f64, f64),
}

/// The two fixed cards, valued from the analytics summary.
pub fn kpi_cards(event_title: &str, summary: &AnalyticsSummary) -> Vec<KpiCard> {
    vec![
        KpiCard {
            id: element_id(event_title, "kpi1"),
            title: "Total Count",
            value: summary.max_count.to_string(),
            change: "4.1% vs last month",
            x: 40.0,
            y: 200.0,
            width: 200.0,
            height: 80.0,
            background: (0.4, 0.8, 0.4),
        },
        KpiCard {
            id: element_id(event_title, "kpi2"),
            title: "Aggregated Count",
            value: summary.average_count.to_string(),
            change: "1.1% vs last month",
            x: 280.0,
            y: 200.0,
            width: 200.0,
            height: 80.0,
            background: (0.8, 0.4, 0.4),
        },
    ]
}

/// Rows of the information table, header first.
pub fn event_details(event: &EventRecord) -> Vec<[String; 2]> {
    vec![
        ["Information".to_string(), "Details".to_string()],
        ["Name".to_string(), event.event_title.clone()],
        ["Date".to_string(), event.start_date.clone()],
        ["Location".to_string(), "12 Melbourne Oxford".to_string()],
        ["Total Attendance".to_string(), "5,000".to_string()],
    ]
}

fn kpi_requests(slide_id: &str, kpi: &KpiCard) -> Vec<Value> {
    let (red, green, blue) = kpi.background;
    let title_id = format!("{}_title", kpi.id);
    let value_id = format!("{}_value", kpi.id);
    let change_id = format!("{}_change", kpi.id);
    vec![
        json!({"createShape": {
            "objectId": kpi.id,
            "shapeType": "RECTANGLE",
            "elementProperties":
                element_properties(slide_id, kpi.x, kpi.y, kpi.width, kpi.height),
        }}),
        json!({"updateShapeProperties": {
            "objectId": kpi.id,
            "shapeProperties": {"shapeBackgroundFill": {
                "solidFill": {"color": {"rgbColor": rgb(red, green, blue)}},
            }},
            "fields": "shapeBackgroundFill",
        }}),
        json!({"createShape": {
            "objectId": title_id,
            "shapeType": "TEXT_BOX",
            "elementProperties": element_properties(
                slide_id, kpi.x + 10.0, kpi.y + 10.0, kpi.width - 20.0, 20.0),
        }}),
        json!({"insertText": {"objectId": title_id, "text": kpi.title}}),
        json!({"updateTextStyle": {
            "objectId": title_id,
            "style": {
                "foregroundColor": {"opaqueColor": {"rgbColor": rgb(0.2, 0.2, 0.2)}},
                "fontSize": pt(14.0),
            },
            "fields": "foregroundColor,fontSize",
        }}),
        json!({"createShape": {
            "objectId": value_id,
            "shapeType": "TEXT_BOX",
            "elementProperties": element_properties(
                slide_id, kpi.x + 10.0, kpi.y + 35.0, kpi.width - 20.0, 30.0),
        }}),
        json!({"insertText": {"objectId": value_id, "text": kpi.value}}),
        json!({"updateTextStyle": {
            "objectId": value_id,
            "style": {
                "fontSize": pt(24.0),
                "bold": true,
                "foregroundColor": {"opaqueColor": {"rgbColor": rgb(0.2, 0.2, 0.2)}},
            },
            "fields": "fontSize,bold,foregroundColor",
        }}),
        json!({"createShape": {
            "objectId": change_id,
            "shapeType": "TEXT_BOX",
            "elementProperties": element_properties(
                slide_id, kpi.x + 10.0, kpi.y + 70.0, kpi.width - 20.0, 20.0),
        }}),
        json!({"insertText": {"objectId": change_id, "text": kpi.change}}),
        json!({"updateTextStyle": {
            "objectId": change_id,
            "style": {
                "foregroundColor": {"opaqueColor": {"rgbColor": rgb(0.2, 0.2, 0.2)}},
                "fontSize": pt(12.0),
            },
            "fields": "foregroundColor,fontSize",
        }}),
    ]
}

/// The full slide batch for one event: slide, optional logo, title, details
/// table, KPI cards, then one linked chart embed per chart id.
pub fn build_batch(event: &EventRecord, spreadsheet_id: &str, chart_ids: &[i64]) -> Vec<Value> {
    let title = &event.event_title;
    let slide_id = element_id(title, "slide");
    let title_id = element_id(title, "title");
    let table_id = element_id(title, "table");

    let mut requests = vec![json!({"createSlide": {
        "objectId": slide_id,
        "insertionIndex": 0,
    }})];

    // Logo only when the event carries one; no placeholder box otherwise.
    if let Some(logo_url) = &event.latest_image_url_id {
        requests.push(json!({"createImage": {
            "url": logo_url,
            "elementProperties": element_properties(&slide_id, 40.0, 20.0, 100.0, 40.0),
        }}));
    }

    requests.push(json!({"createShape": {
        "objectId": title_id,
        "shapeType": "TEXT_BOX",
        "elementProperties": element_properties(&slide_id, 40.0, 40.0, 400.0, 40.0),
    }}));
    requests.push(json!({"insertText": {"objectId": title_id, "text": TITLE_TEXT}}));
    requests.push(json!({"updateTextStyle": {
        "objectId": title_id,
        "style": {
            "fontSize": pt(24.0),
            "foregroundColor": {"opaqueColor": {"rgbColor": rgb(0.2, 0.2, 0.2)}},
            "bold": true,
        },
        "fields": "fontSize,foregroundColor,bold",
    }}));

    let details = event_details(event);
    requests.push(json!({"createTable": {
        "objectId": table_id,
        "rows": details.len(),
        "columns": 2,
        "elementProperties": element_properties(&slide_id, 40.0, 100.0, 500.0, 120.0),
    }}));
    for (row, cells) in details.iter().enumerate() {
        for (column, cell) in cells.iter().enumerate() {
            requests.push(json!({"insertText": {
                "objectId": table_id,
                "cellLocation": {"rowIndex": row, "columnIndex": column},
                "text": cell,
            }}));
        }
    }
    requests.push(json!({"updateTableCellProperties": {
        "objectId": table_id,
        "tableRange": {
            "location": {"rowIndex": 0, "columnIndex": 0},
            "rowSpan": 1,
            "columnSpan": 2,
        },
        "tableCellProperties": {"tableCellBackgroundFill": {
            "solidFill": {"color": {"rgbColor": rgb(0.23, 0.51, 0.79)}},
        }},
        "fields": "tableCellBackgroundFill",
    }}));
    requests.push(json!({"updateTextStyle": {
        "objectId": table_id,
        "cellLocation": {"rowIndex": 0, "columnIndex": 0},
        "style": {
            "foregroundColor": {"opaqueColor": {"rgbColor": rgb(1.0, 1.0, 1.0)}},
            "bold": true,
        },
        "fields": "foregroundColor,bold",
    }}));

    for kpi in kpi_cards(title, &event.analytics_summary) {
        requests.extend(kpi_requests(&slide_id, &kpi));
    }

    // Embeds stack downward from the first chart slot.
    for (index, chart_id) in chart_ids.iter().enumerate() {
        let embed_id = element_id(title, &format!("chart{}", index + 1));
        requests.push(json!({"createSheetsChart": {
            "objectId": embed_id,
            "spreadsheetId": spreadsheet_id,
            "chartId": chart_id,
            "linkingMode": "LINKED",
            "elementProperties": element_properties(
                &slide_id, 40.0, 450.0 + 200.0 * index as f64, 500.0, 180.0),
        }}));
    }

    requests
}

/// Delete requests for every slide beyond the first. The template ships with
/// extra slides; trimming runs only after the main batch has committed.
pub fn cleanup_requests(presentation: &Value) -> Vec<Value> {
    presentation["slides"]
        .as_array()
        .into_iter()
        .flatten()
        .skip(1)
        .filter_map(|slide| slide["objectId"].as_str())
        .map(|object_id| json!({"deleteObject": {"objectId": object_id}}))
        .collect()
}

/// Copy the template, apply the slide batch, then trim the copy down to the
/// one content slide. Returns the presentation id.
pub async fn build_deck(
    session: &Session,
    config: &Config,
    event: &EventRecord,
    spreadsheet_id: &str,
    chart_ids: &[i64],
) -> Result<String> {
    let presentation_id = session
        .copy_file(
            &config.template_presentation_id,
            &format!("{DECK_NAME_PREFIX} - {}", event.event_title),
        )
        .await?;

    let requests = build_batch(event, spreadsheet_id, chart_ids);
    session
        .slides_batch_update(&presentation_id, requests)
        .await?;

    let presentation = session.get_presentation(&presentation_id).await?;
    let cleanup = cleanup_requests(&presentation);
    if !cleanup.is_empty() {
        session
            .slides_batch_update(&presentation_id, cleanup)
            .await?;
    }

    Ok(presentation_id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn demo_event() -> EventRecord {
        serde_json::from_value(json!({
            "event_title": "Demo",
            "start_date": "2024-04-30",
            "end_date": "2024-05-01",
            "analytics": [],
            "analytics_summary": {"average_count": 10, "max_count": 22},
        }))
        .unwrap()
    }

    /// Ids an operation creates, if any.
    fn created_ids(op: &Value) -> Vec<String> {
        ["createSlide", "createShape", "createTable", "createSheetsChart"]
            .iter()
            .filter_map(|kind| op[kind]["objectId"].as_str())
            .map(str::to_string)
            .collect()
    }

    /// Ids an operation references without creating.
    fn referenced_ids(op: &Value) -> Vec<String> {
        let mut ids = Vec::new();
        for kind in [
            "insertText",
            "updateTextStyle",
            "updateShapeProperties",
            "updateTableCellProperties",
        ] {
            if let Some(id) = op[kind]["objectId"].as_str() {
                ids.push(id.to_string());
            }
        }
        for kind in ["createShape", "createTable", "createImage", "createSheetsChart"] {
            if let Some(page) = op[kind]["elementProperties"]["pageObjectId"].as_str() {
                ids.push(page.to_string());
            }
        }
        ids
    }

    #[test]
    fn element_ids_are_stable_and_collision_resistant() {
        assert_eq!(element_id("Demo", "slide"), element_id("Demo", "slide"));
        assert_ne!(element_id("Demo", "slide"), element_id("Demo", "title"));
        // Titles sharing a 10-char prefix must still get distinct ids.
        assert_ne!(
            element_id("Winter Gala 2024", "slide"),
            element_id("Winter Gala 2025", "slide")
        );
    }

    #[test]
    fn every_reference_follows_its_creation() {
        let mut event = demo_event();
        event.latest_image_url_id = Some("https://example.com/logo.png".to_string());
        let batch = build_batch(&event, "sheet-1", &[111, 222]);

        let mut created = HashSet::new();
        for op in &batch {
            for id in referenced_ids(op) {
                assert!(
                    created.contains(&id),
                    "operation {op} references {id} before it is created"
                );
            }
            for id in created_ids(op) {
                created.insert(id);
            }
        }
        // slide + title + table + 2 KPIs * 4 shapes + 2 embeds
        assert_eq!(created.len(), 13);
    }

    #[test]
    fn logo_is_skipped_entirely_without_a_url() {
        let batch = build_batch(&demo_event(), "sheet-1", &[1]);
        assert!(batch.iter().all(|op| op["createImage"].is_null()));

        let mut event = demo_event();
        event.latest_image_url_id = Some("https://example.com/logo.png".to_string());
        let batch = build_batch(&event, "sheet-1", &[1]);
        let image = batch
            .iter()
            .find(|op| !op["createImage"].is_null())
            .unwrap();
        assert_eq!(image["createImage"]["url"], "https://example.com/logo.png");
    }

    #[test]
    fn kpi_values_come_from_the_analytics_summary() {
        let event = demo_event();
        let cards = kpi_cards(&event.event_title, &event.analytics_summary);
        assert_eq!(cards[0].title, "Total Count");
        assert_eq!(cards[0].value, "22");
        assert_eq!(cards[1].title, "Aggregated Count");
        assert_eq!(cards[1].value, "10");
    }

    #[test]
    fn table_rows_cover_header_plus_four_detail_rows() {
        let event = demo_event();
        let details = event_details(&event);
        assert_eq!(details.len(), 5);
        assert_eq!(details[1], ["Name".to_string(), "Demo".to_string()]);
        assert_eq!(details[2][1], "2024-04-30");

        let batch = build_batch(&event, "sheet-1", &[]);
        let cell_inserts = batch
            .iter()
            .filter(|op| !op["insertText"]["cellLocation"].is_null())
            .count();
        assert_eq!(cell_inserts, 10);
    }

    #[test]
    fn chart_embeds_link_and_stack_vertically() {
        let batch = build_batch(&demo_event(), "sheet-abc", &[314, 159]);
        let embeds: Vec<&Value> = batch
            .iter()
            .filter(|op| !op["createSheetsChart"].is_null())
            .collect();
        assert_eq!(embeds.len(), 2);
        for (index, embed) in embeds.iter().enumerate() {
            let op = &embed["createSheetsChart"];
            assert_eq!(op["spreadsheetId"], "sheet-abc");
            assert_eq!(op["linkingMode"], "LINKED");
            assert_eq!(
                op["elementProperties"]["transform"]["translateY"],
                450.0 + 200.0 * index as f64
            );
        }
        assert_eq!(embeds[0]["createSheetsChart"]["chartId"], 314);
        assert_eq!(embeds[1]["createSheetsChart"]["chartId"], 159);
    }

    #[test]
    fn cleanup_deletes_every_slide_beyond_the_first() {
        let three = json!({"slides": [
            {"objectId": "p1"}, {"objectId": "p2"}, {"objectId": "p3"},
        ]});
        let requests = cleanup_requests(&three);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["deleteObject"]["objectId"], "p2");
        assert_eq!(requests[1]["deleteObject"]["objectId"], "p3");

        let one = json!({"slides": [{"objectId": "p1"}]});
        assert!(cleanup_requests(&one).is_empty());
    }
}
