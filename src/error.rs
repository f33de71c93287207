use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors surfaced while wiring the card into the page.
///
/// Only setup can fail loudly; once the card is running, effect failures are
/// logged and skipped.
#[derive(Debug, Error)]
pub enum CardError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("element #{0} not found")]
    MissingElement(String),
    #[error("browser call failed: {0}")]
    Js(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("config parse error: {0}")]
    Config(String),
    #[error("card already started; call stop_card first")]
    AlreadyStarted,
}

#[cfg(feature = "serde_json")]
impl From<serde_json::Error> for CardError {
    fn from(err: serde_json::Error) -> Self {
        CardError::Config(err.to_string())
    }
}

impl From<JsValue> for CardError {
    fn from(value: JsValue) -> Self {
        CardError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<CardError> for JsValue {
    fn from(err: CardError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type Result<T, E = CardError> = std::result::Result<T, E>;
