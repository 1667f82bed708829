//! # markdown2pdf-mcp
//!
//! A Model Context Protocol server, spoken as newline-delimited JSON-RPC 2.0
//! over stdin/stdout, that exposes one tool: convert a Markdown document to
//! PDF through a Lightning-paywalled conversion API.
//!
//! ## Architecture
//!
//! ```text
//! stdin ─▶ frame ─▶ protocol::decode ─▶ dispatch ─┬─▶ initialize / *list / ping
//!                                                  └─▶ convert ─▶ workflow
//! stdout ◀──────────── one line per response ◀─────────────────────┘
//! ```
//!
//! * [`frame`]   : cut the byte stream into lines
//! * [`protocol`]: validate JSON-RPC envelopes, build responses
//! * [`dispatch`]: route methods; `tools/call` and `markdown2pdf` reach the workflow
//! * [`convert`] : submit → (402: payment challenge) → poll → fetch
//! * [`server`]  : the strictly sequential read/dispatch/write loop
//!
//! ## Payment
//!
//! The backend answers a submission with HTTP 402 until the caller has paid.
//! That is returned as a successful tool result with
//! `"status": "payment_required"`, the invoice and its QR code. The caller
//! pays out of band and sends the identical request again.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use markdown2pdf_mcp::{serve_stdio, Converter, Dispatcher, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::builder()
//!         .base_url("https://intelligence-api-qa.ent.sdy.ai")
//!         .build()?;
//!     let dispatcher = Dispatcher::new(Converter::from_config(config)?);
//!     serve_stdio(&dispatcher).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `markdown2pdf-mcp` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod output;
pub mod prompts;
pub mod protocol;
pub mod server;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PollPolicy, ServerConfig, ServerConfigBuilder};
pub use convert::Converter;
pub use dispatch::Dispatcher;
pub use error::Markdown2PdfError;
pub use frame::{FrameBuffer, FrameReader};
pub use output::ConversionOutcome;
pub use protocol::{Request, Response, RpcError};
pub use server::{serve, serve_stdio};
pub use workflow::payment::PaymentChallenge;
pub use workflow::transport::{HttpReply, HttpTransport, ReqwestTransport, TransportError};
