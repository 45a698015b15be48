//! Per-endpoint decoding of [`ResponseBody`] into typed results.
//!
//! The node is loose about content types: the same endpoint may answer with
//! `application/json` or bare text depending on version, so integer and txid
//! decoders accept either.

use bitcoin::Txid;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::ClientError;
use crate::transport::ResponseBody;

pub(crate) fn decode_json<T: DeserializeOwned>(
    body: ResponseBody,
    what: &str,
) -> Result<T, ClientError> {
    let value = match body {
        ResponseBody::Json(value) => value,
        ResponseBody::Text(text) => serde_json::from_str(&text)
            .map_err(|e| ClientError::InvalidResponse(format!("{what}: {e}; body={text}")))?,
        ResponseBody::Empty => {
            return Err(ClientError::InvalidResponse(format!("{what}: empty body")));
        }
    };
    serde_json::from_value(value)
        .map_err(|e| ClientError::InvalidResponse(format!("{what}: {e}")))
}

pub(crate) fn decode_height(body: ResponseBody) -> Result<u64, ClientError> {
    match body {
        ResponseBody::Json(value) => value
            .as_u64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .ok_or_else(|| ClientError::InvalidResponse(format!("height: expected integer, got {value}"))),
        ResponseBody::Text(text) => text
            .trim()
            .parse()
            .map_err(|e| ClientError::InvalidResponse(format!("height: {e}; body={text}"))),
        ResponseBody::Empty => Err(ClientError::InvalidResponse("height: empty body".into())),
    }
}

pub(crate) fn decode_txid(body: ResponseBody) -> Result<Txid, ClientError> {
    let raw = match body {
        ResponseBody::Json(serde_json::Value::String(s)) | ResponseBody::Text(s) => s,
        ResponseBody::Json(other) => {
            return Err(ClientError::InvalidResponse(format!(
                "txid: expected string, got {other}"
            )));
        }
        ResponseBody::Empty => return Err(ClientError::InvalidResponse("txid: empty body".into())),
    };
    raw.trim()
        .parse()
        .map_err(|e| ClientError::InvalidResponse(format!("txid: {e}; body={raw}")))
}

/// Accept a `u32` encoded either as a JSON number or a numeric string.
pub(crate) fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
