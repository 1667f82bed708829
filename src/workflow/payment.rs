//! Payment challenges returned by the submission endpoint (HTTP 402).
//!
//! The backend can answer a submission with one of two challenge shapes:
//!
//! * **Direct**: the 402 body already carries a Lightning invoice
//!   (`payment_request`), its QR rendering and the price.
//! * **Offer-based**: the 402 body lists priced `offers` together with a
//!   `payment_context_token` and a `payment_request_url`. The first offer is
//!   chosen and a second POST to `payment_request_url` yields the invoice.
//!
//! Which one applies is decided by the body's shape alone. Either way the
//! result is a [`PaymentChallenge`] that is handed back to the caller
//! untouched: the workflow never waits for settlement and never caches a
//! challenge, so resubmitting without paying yields a fresh 402.

use crate::config::resolve_location;
use crate::error::Markdown2PdfError;
use crate::workflow::transport::HttpTransport;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Number, Value};
use tracing::{debug, info};

/// Instruction returned alongside every challenge.
pub const PAY_AND_RESUBMIT: &str =
    "Payment required. Pay the Lightning invoice, then call markdown2pdf again with the same arguments.";

/// Payment method requested when turning an offer into an invoice.
const PAYMENT_METHOD: &str = "lightning";

/// What the caller must pay before the conversion can run.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentChallenge {
    Direct(DirectChallenge),
    OfferBased(OfferChallenge),
}

/// Challenge whose invoice came embedded in the 402 body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DirectChallenge {
    /// BOLT11 invoice.
    pub payment_request: String,
    #[serde(default, rename = "payment_qr_svg")]
    pub qr_svg_url: Option<String>,
    #[serde(default)]
    pub amount_sats: Option<Number>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Challenge resolved by requesting an invoice for the first offer.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferChallenge {
    pub offer: Offer,
    pub payment_request: String,
    pub qr_svg_url: Option<String>,
}

/// One priced option from an offer list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Offer {
    pub id: String,
    #[serde(default)]
    pub amount: Option<Number>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Offer {
    fn detail(&self) -> Option<&str> {
        self.description.as_deref().or(self.title.as_deref())
    }
}

/// Offer list from a 402 body, before an offer has been chosen.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OfferList {
    pub offers: Vec<Offer>,
    pub payment_context_token: String,
    pub payment_request_url: String,
}

/// A parsed 402 body.
#[derive(Debug, Clone, PartialEq)]
pub enum Challenge {
    Direct(DirectChallenge),
    Offers(OfferList),
}

impl Challenge {
    /// Classify a 402 body by its shape.
    pub fn from_body(body: &Value) -> Result<Self, Markdown2PdfError> {
        let Some(fields) = body.as_object() else {
            return Err(unrecognised("body is not an object"));
        };

        if fields.contains_key("offers") {
            let list: OfferList = serde_json::from_value(body.clone())
                .map_err(|e| unrecognised(&format!("malformed offer list: {e}")))?;
            if list.offers.is_empty() {
                return Err(unrecognised("offer list is empty"));
            }
            return Ok(Challenge::Offers(list));
        }

        if fields.get("payment_request").is_some_and(Value::is_string) {
            let direct: DirectChallenge = serde_json::from_value(body.clone())
                .map_err(|e| unrecognised(&format!("malformed invoice challenge: {e}")))?;
            return Ok(Challenge::Direct(direct));
        }

        Err(unrecognised("neither an invoice nor an offer list"))
    }

    /// Turn the parsed body into a payable challenge, requesting an invoice
    /// for the first offer when needed.
    pub async fn resolve(
        self,
        transport: &dyn HttpTransport,
        base: &Url,
    ) -> Result<PaymentChallenge, Markdown2PdfError> {
        match self {
            Challenge::Direct(direct) => Ok(PaymentChallenge::Direct(direct)),
            Challenge::Offers(list) => request_invoice(transport, base, list).await,
        }
    }
}

fn unrecognised(detail: &str) -> Markdown2PdfError {
    Markdown2PdfError::UnrecognisedChallenge {
        detail: detail.to_string(),
    }
}

fn payment_failed(reason: impl Into<String>) -> Markdown2PdfError {
    Markdown2PdfError::PaymentRequestFailed {
        reason: reason.into(),
    }
}

/// Invoice field of a payment-request reply: either the bare invoice or an
/// object keyed by payment method.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InvoiceField {
    Plain(String),
    Lightning { lightning_invoice: String },
}

#[derive(Debug, Deserialize)]
struct InvoiceReply {
    payment_request: InvoiceField,
    #[serde(default)]
    payment_qr_svg: Option<String>,
}

/// POST the chosen offer to the payment-request endpoint.
async fn request_invoice(
    transport: &dyn HttpTransport,
    base: &Url,
    list: OfferList,
) -> Result<PaymentChallenge, Markdown2PdfError> {
    let OfferList {
        offers,
        payment_context_token,
        payment_request_url,
    } = list;
    let Some(offer) = offers.into_iter().next() else {
        return Err(unrecognised("offer list is empty"));
    };

    let url = resolve_location(base, &payment_request_url)
        .map_err(|e| payment_failed(format!("invalid payment request URL '{payment_request_url}': {e}")))?;
    info!(offer_id = %offer.id, %url, "Requesting invoice for offer");

    let body = json!({
        "offer_id": offer.id,
        "payment_context_token": payment_context_token,
        "payment_method": PAYMENT_METHOD,
    });
    let reply = transport
        .post_json(&url, &body)
        .await
        .map_err(|e| payment_failed(e.to_string()))?;

    if !reply.is_success() {
        return Err(payment_failed(format!("Unexpected response: {}", reply.status)));
    }

    let invoice: InvoiceReply = reply.json().map_err(|e| payment_failed(e.to_string()))?;
    let payment_request = match invoice.payment_request {
        InvoiceField::Plain(s) | InvoiceField::Lightning { lightning_invoice: s } => s,
    };
    if payment_request.is_empty() {
        return Err(payment_failed("reply did not include an invoice"));
    }
    debug!(offer_id = %offer.id, "Invoice received");

    Ok(PaymentChallenge::OfferBased(OfferChallenge {
        offer,
        payment_request,
        qr_svg_url: invoice.payment_qr_svg,
    }))
}

impl PaymentChallenge {
    /// Payload embedded in the tool result.
    pub fn payload(&self) -> Value {
        match self {
            PaymentChallenge::Direct(d) => json!({
                "status": "payment_required",
                "message": PAY_AND_RESUBMIT,
                "qr_svg_url": d.qr_svg_url,
                "payment_request": d.payment_request,
                "amount_in_satoshis": d.amount_sats,
                "currency": d.currency,
                "detail": d.detail,
            }),
            PaymentChallenge::OfferBased(o) => json!({
                "status": "payment_required",
                "message": PAY_AND_RESUBMIT,
                "qr_svg_url": o.qr_svg_url,
                "payment_request": o.payment_request,
                "amount": o.offer.amount,
                "currency": o.offer.currency,
                "detail": o.offer.detail(),
                "offer_id": o.offer.id,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_challenge_is_recognised() {
        let body = json!({
            "payment_request": "lnbc10u1...",
            "payment_qr_svg": "https://x/qr.svg",
            "amount_sats": 1000,
            "currency": "SAT",
            "detail": "Markdown to PDF"
        });
        let Challenge::Direct(d) = Challenge::from_body(&body).unwrap() else {
            panic!("expected direct challenge");
        };
        assert_eq!(d.payment_request, "lnbc10u1...");
        assert_eq!(d.qr_svg_url.as_deref(), Some("https://x/qr.svg"));
        assert_eq!(d.amount_sats, Some(Number::from(1000)));
    }

    #[test]
    fn offer_list_is_recognised() {
        let body = json!({
            "offers": [
                {"id": "offer_a", "amount": 50, "currency": "USD", "title": "One PDF"},
                {"id": "offer_b", "amount": 400, "currency": "USD"}
            ],
            "payment_context_token": "ctx-123",
            "payment_request_url": "/l402/payment-request"
        });
        let Challenge::Offers(list) = Challenge::from_body(&body).unwrap() else {
            panic!("expected offer list");
        };
        assert_eq!(list.offers.len(), 2);
        assert_eq!(list.offers[0].id, "offer_a");
        assert_eq!(list.payment_context_token, "ctx-123");
    }

    #[test]
    fn empty_offer_list_is_rejected() {
        let body = json!({
            "offers": [],
            "payment_context_token": "ctx",
            "payment_request_url": "/pay"
        });
        assert!(matches!(
            Challenge::from_body(&body),
            Err(Markdown2PdfError::UnrecognisedChallenge { .. })
        ));
    }

    #[test]
    fn unknown_shape_is_rejected() {
        for body in [json!({"error": "pay up"}), json!("402"), json!({"payment_request": 12})] {
            assert!(Challenge::from_body(&body).is_err(), "accepted {body}");
        }
    }

    #[test]
    fn direct_payload_uses_satoshi_key() {
        let challenge = PaymentChallenge::Direct(DirectChallenge {
            payment_request: "lnbc1".into(),
            qr_svg_url: Some("https://x/qr.svg".into()),
            amount_sats: Some(Number::from(21)),
            currency: Some("SAT".into()),
            detail: None,
        });
        let payload = challenge.payload();
        assert_eq!(payload["status"], "payment_required");
        assert_eq!(payload["amount_in_satoshis"], 21);
        assert_eq!(payload["payment_request"], "lnbc1");
        assert_eq!(payload["qr_svg_url"], "https://x/qr.svg");
        assert!(payload["detail"].is_null());
    }

    #[test]
    fn offer_payload_falls_back_to_title_for_detail() {
        let challenge = PaymentChallenge::OfferBased(OfferChallenge {
            offer: Offer {
                id: "offer_a".into(),
                amount: Some(Number::from(50)),
                currency: Some("USD".into()),
                title: Some("One PDF".into()),
                description: None,
            },
            payment_request: "lnbc2".into(),
            qr_svg_url: None,
        });
        let payload = challenge.payload();
        assert_eq!(payload["amount"], 50);
        assert_eq!(payload["detail"], "One PDF");
        assert_eq!(payload["offer_id"], "offer_a");
        assert!(payload["message"].as_str().unwrap().contains("same arguments"));
    }
}
