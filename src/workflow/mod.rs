//! Phases of a conversion job against the backend.
//!
//! Each submodule owns one step. All network I/O goes through
//! [`transport::HttpTransport`], so every phase can be exercised against a
//! scripted backend.
//!
//! ## Data Flow
//!
//! ```text
//! params ──▶ request ──▶ submit ──▶ poll ──▶ fetch ──▶ PDF URL
//!                          │
//!                          └─(402)─▶ payment ──▶ challenge for the caller
//! ```
//!
//! 1. [`request`]: validate the parameter bag and build the POST payload
//! 2. [`submit`] : POST the document; a 402 ends the call with a challenge
//! 3. [`payment`]: classify the 402 body, fetching an invoice for offer lists
//! 4. [`poll`]   : fixed-interval status loop, modelled as a state machine
//! 5. [`fetch`]  : read the final resource for the PDF URL

pub mod fetch;
pub mod payment;
pub mod poll;
pub mod request;
pub mod submit;
pub mod transport;
