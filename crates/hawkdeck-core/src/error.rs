use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("API call to {endpoint} failed with status {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Tab {tab:?} not found in spreadsheet metadata")]
    TabNotFound { tab: String },

    #[error("Requested {requested} charts but only {found} chart ids were resolved")]
    ChartResolution { requested: usize, found: usize },

    #[error("Analytics sample {index} has a malformed datetime {datetime:?}")]
    MalformedSample { index: usize, datetime: String },

    #[error("Copying the deck template returned no file id")]
    TemplateCopyFailed,

    #[error("Service response is missing {field}")]
    MissingField { field: &'static str },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Missing access token: set {env_var} or write a token file")]
    MissingToken { env_var: String },
}

pub type Result<T> = std::result::Result<T, DeckError>;
