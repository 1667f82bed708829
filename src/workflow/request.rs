//! Conversion parameters: validation and submission payload.
//!
//! Parameters arrive as an open JSON bag (`params` of a direct call, or
//! `arguments` of a `tools/call`). Each field is checked where it is read;
//! nothing is deserialized into a struct before it has been validated.

use crate::error::Markdown2PdfError;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

const REQUIRED_FIELDS_MESSAGE: &str = "text_body and title are required";

/// A validated request to convert one Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub text_body: String,
    pub title: String,
    /// `YYYY-MM-DD`, either caller-supplied or the submission date.
    pub date: String,
}

impl ConversionRequest {
    /// Validate `params`, defaulting the date to today (UTC).
    pub fn from_params(params: Option<&Value>) -> Result<Self, Markdown2PdfError> {
        Self::from_params_on(params, Utc::now().date_naive())
    }

    /// Validate `params`, defaulting the date to `today`.
    pub fn from_params_on(params: Option<&Value>, today: NaiveDate) -> Result<Self, Markdown2PdfError> {
        let fields = params.and_then(Value::as_object);
        let text_body = fields.and_then(|f| non_empty_str(f.get("text_body")));
        let title = fields.and_then(|f| non_empty_str(f.get("title")));

        let (Some(text_body), Some(title)) = (text_body, title) else {
            return Err(Markdown2PdfError::InvalidParams(REQUIRED_FIELDS_MESSAGE.into()));
        };

        let date = match fields.and_then(|f| f.get("date")) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(Markdown2PdfError::InvalidParams(
                    "date must be a string (YYYY-MM-DD)".into(),
                ));
            }
        };

        Ok(Self {
            text_body: text_body.to_string(),
            title: title.to_string(),
            date: date.unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
        })
    }

    /// Body POSTed to the submission endpoint.
    pub fn payload(&self) -> Value {
        json!({
            "data": {
                "text_body": self.text_body,
                "meta": {
                    "title": self.title,
                    "date": self.date,
                },
            },
            "options": {
                "document_name": self.title,
            },
        })
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
