//! Quote request decoding and quote response encoding

use crate::domain::{Leg, LimitOrder, QuoteRequest, QuoteResponse};
use crate::error::{CallbackError, QuotingError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Inbound event carrying quote requests
pub const QUOTE_REQUEST_EVENT: &str = "quote_request";
/// Outbound event carrying quote responses
pub const QUOTE_RESPONSE_EVENT: &str = "quote_response";

const MAX_LEGS: usize = 2;

#[derive(Debug, Deserialize)]
struct RawQuoteRequest {
    request_id: String,
    legs: Vec<Leg>,
}

/// Turn a `quote_request` payload into a typed request
///
/// Anything malformed is a [`QuotingError::Decode`]; a partially built
/// request never leaves this function.
pub fn decode_quote_request(payload: Value) -> Result<QuoteRequest> {
    if !payload.is_object() {
        return Err(QuotingError::Decode(format!(
            "expected an object, got {}",
            kind(&payload)
        )));
    }

    let raw: RawQuoteRequest =
        serde_json::from_value(payload).map_err(|e| QuotingError::Decode(e.to_string()))?;

    if raw.request_id.is_empty() {
        return Err(QuotingError::Decode("empty request_id".into()));
    }

    let mut legs = raw.legs.into_iter();
    let (leg1, leg2) = match (legs.next(), legs.next(), legs.len()) {
        (Some(leg1), leg2, 0) => (leg1, leg2),
        (None, _, _) => {
            return Err(QuotingError::Decode(format!(
                "request {} has no legs",
                raw.request_id
            )))
        }
        (Some(_), _, extra) => {
            return Err(QuotingError::Decode(format!(
                "request {} has {} legs, at most {} are supported",
                raw.request_id,
                MAX_LEGS + extra,
                MAX_LEGS
            )))
        }
    };

    Ok(QuoteRequest {
        request_id: raw.request_id,
        leg1,
        leg2,
    })
}

/// Check pricing output against its request and build the response
pub fn encode_quote_response(
    request: &QuoteRequest,
    legs: Vec<Vec<LimitOrder>>,
) -> std::result::Result<QuoteResponse, CallbackError> {
    QuoteResponse::for_request(request, legs)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
