//! Tool and prompt catalog advertised to MCP clients.
//!
//! The server exposes exactly one tool (`markdown2pdf`) and one prompt
//! (`convert_markdown`). Descriptors are plain JSON so they can be returned
//! from `tools/list` / `prompts/list` without an intermediate type.

use serde_json::{json, Value};

/// Name of the single tool, also accepted as a direct JSON-RPC method.
pub const TOOL_NAME: &str = "markdown2pdf";

/// Name of the single prompt.
pub const PROMPT_NAME: &str = "convert_markdown";

/// MCP protocol revision spoken by this server.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Descriptor returned by `tools/list`.
pub fn tool_descriptor() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": "Convert markdown to PDF, and pay with Lightning",
        "inputSchema": {
            "type": "object",
            "required": ["text_body", "title"],
            "properties": {
                "text_body": {
                    "type": "string",
                    "description": "Markdown text to convert"
                },
                "title": {
                    "type": "string",
                    "description": "Document title"
                },
                "date": {
                    "type": "string",
                    "description": "Document date (YYYY-MM-DD)"
                }
            }
        }
    })
}

/// Descriptor returned by `prompts/list`.
pub fn prompt_descriptor() -> Value {
    json!({
        "name": PROMPT_NAME,
        "description": "Convert markdown to PDF",
        "arguments": [
            {
                "name": "title",
                "description": "Document title",
                "required": false
            },
            {
                "name": "text_body",
                "description": "Markdown text to convert",
                "required": false
            }
        ]
    })
}

/// Body of a `prompts/get` reply for [`PROMPT_NAME`].
///
/// `arguments` is the optional string map sent by the client; `title` and
/// `text_body` are interpolated when present.
pub fn render_prompt(arguments: Option<&Value>) -> Value {
    let arg = |key: &str| {
        arguments
            .and_then(|a| a.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };

    let mut text = format!("Use the {TOOL_NAME} tool to convert the following Markdown to a PDF");
    if let Some(title) = arg("title") {
        text.push_str(&format!(" titled \"{title}\""));
    }
    text.push('.');
    text.push_str(
        " If the tool reports that payment is required, show the Lightning invoice and QR code, \
and call the tool again with the same arguments once it has been paid.",
    );
    if let Some(body) = arg("text_body") {
        text.push_str("\n\n");
        text.push_str(body);
    }

    json!({
        "description": "Convert markdown to PDF",
        "messages": [{
            "role": "user",
            "content": {
                "type": "text",
                "text": text
            }
        }]
    })
}
