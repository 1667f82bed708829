//! Conversion outcomes and their tool-result rendering.

use crate::workflow::payment::PaymentChallenge;
use serde_json::{json, Value};

/// A conversion call that did not fail.
///
/// Payment-required is a normal outcome: it carries what the caller needs
/// to pay, after which the identical request is sent again.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    PaymentRequired(PaymentChallenge),
    Complete { url: String },
}

impl ConversionOutcome {
    /// Domain payload, e.g. `{"status":"complete","url":"…"}`.
    pub fn payload(&self) -> Value {
        match self {
            ConversionOutcome::PaymentRequired(challenge) => challenge.payload(),
            ConversionOutcome::Complete { url } => json!({
                "status": "complete",
                "url": url,
            }),
        }
    }

    /// MCP tool result: the payload serialized into a single text block.
    pub fn to_tool_result(&self) -> Value {
        json!({
            "content": [{
                "type": "text",
                "text": self.payload().to_string(),
            }]
        })
    }
}
