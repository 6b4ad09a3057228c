use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{DeckError, Result};

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SLIDES_BASE: &str = "https://slides.googleapis.com/v1/presentations";
const DRIVE_BASE: &str = "https://www.googleapis.com/drive/v3/files";

/// An authenticated session against the spreadsheet, presentation and file
/// services. Token acquisition and refresh happen upstream; the session only
/// attaches the bearer credential it was handed.
pub struct Session {
    http: Client,
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Session {
            http: Client::new(),
            token: token.into(),
        }
    }

    async fn send_json(&self, req: reqwest::RequestBuilder, endpoint: &str) -> Result<Value> {
        let response = req
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeckError::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json::<Value>().await?)
    }

    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.send_json(self.http.post(endpoint).json(body), endpoint)
            .await
    }

    async fn put_json(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.send_json(self.http.put(endpoint).json(body), endpoint)
            .await
    }

    async fn get_json(&self, endpoint: &str) -> Result<Value> {
        self.send_json(self.http.get(endpoint), endpoint).await
    }

    /// Create a spreadsheet with one empty tab per name. The response carries
    /// the spreadsheet id but not the numeric tab ids; those need a follow-up
    /// metadata read.
    pub async fn create_spreadsheet(&self, title: &str, tabs: &[&str]) -> Result<Value> {
        let sheets: Vec<Value> = tabs
            .iter()
            .map(|tab| json!({"properties": {"title": tab}}))
            .collect();
        self.post_json(
            SHEETS_BASE,
            &json!({
                "properties": {"title": title},
                "sheets": sheets,
            }),
        )
        .await
    }

    /// Write raw values into an A1-notation range.
    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Value,
    ) -> Result<()> {
        let endpoint = format!(
            "{SHEETS_BASE}/{spreadsheet_id}/values/{range}?valueInputOption=RAW"
        );
        self.put_json(&endpoint, &json!({"values": values})).await?;
        Ok(())
    }

    pub async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Value> {
        self.get_json(&format!("{SHEETS_BASE}/{spreadsheet_id}"))
            .await
    }

    pub async fn sheets_batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Value>,
    ) -> Result<Value> {
        self.post_json(
            &format!("{SHEETS_BASE}/{spreadsheet_id}:batchUpdate"),
            &json!({"requests": requests}),
        )
        .await
    }

    /// Copy a file (the deck template) and return the new file's id.
    pub async fn copy_file(&self, file_id: &str, name: &str) -> Result<String> {
        let copied = self
            .post_json(
                &format!("{DRIVE_BASE}/{file_id}/copy"),
                &json!({"name": name}),
            )
            .await?;
        copied["id"]
            .as_str()
            .map(str::to_string)
            .ok_or(DeckError::TemplateCopyFailed)
    }

    pub async fn get_presentation(&self, presentation_id: &str) -> Result<Value> {
        self.get_json(&format!("{SLIDES_BASE}/{presentation_id}"))
            .await
    }

    pub async fn slides_batch_update(
        &self,
        presentation_id: &str,
        requests: Vec<Value>,
    ) -> Result<Value> {
        self.post_json(
            &format!("{SLIDES_BASE}/{presentation_id}:batchUpdate"),
            &json!({"requests": requests}),
        )
        .await
    }
}

/// Share-style URL for a created spreadsheet.
pub fn spreadsheet_url(spreadsheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}")
}

/// Share-style URL for a created presentation.
pub fn presentation_url(presentation_id: &str) -> String {
    format!("https://docs.google.com/presentation/d/{presentation_id}/edit")
}
