// ABOUTME: Inbound message decoding for POSTed JSON-RPC payloads
// ABOUTME: Validates the minimal JSON-RPC 2.0 envelope before producing the typed message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::error::{TransportError, TransportResult};
use crate::jsonrpc::{JsonRpcMessage, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION};
use serde_json::{Map, Value};

/// Decode a raw POST body into a JSON-RPC message
///
/// The size ceiling is the HTTP layer's job; this only checks shape.
///
/// # Errors
///
/// - `EmptyMessage` for an empty or whitespace-only body
/// - `InvalidJson` when the body is not JSON or does not fit the message model
/// - `InvalidEnvelope` when the JSON is not a JSON-RPC 2.0 message
pub fn decode_message(data: &[u8]) -> TransportResult<JsonRpcMessage> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(TransportError::EmptyMessage);
    }

    let value: Value = serde_json::from_slice(data).map_err(TransportError::InvalidJson)?;
    let object = match value {
        Value::Object(object) => object,
        Value::Array(_) => {
            return Err(TransportError::InvalidEnvelope(
                "batch messages are not supported".to_owned(),
            ))
        }
        _ => {
            return Err(TransportError::InvalidEnvelope(
                "expected a JSON object".to_owned(),
            ))
        }
    };

    check_version(&object)?;
    check_id(&object)?;

    if object.contains_key("method") {
        if !object.get("method").is_some_and(Value::is_string) {
            return Err(TransportError::InvalidEnvelope(
                "method must be a string".to_owned(),
            ));
        }
        serde_json::from_value::<JsonRpcRequest>(Value::Object(object))
            .map(JsonRpcMessage::Request)
            .map_err(TransportError::InvalidJson)
    } else {
        check_response_shape(&object)?;
        serde_json::from_value::<JsonRpcResponse>(Value::Object(object))
            .map(JsonRpcMessage::Response)
            .map_err(TransportError::InvalidJson)
    }
}

fn check_version(object: &Map<String, Value>) -> TransportResult<()> {
    match object.get("jsonrpc").and_then(Value::as_str) {
        Some(JSONRPC_VERSION) => Ok(()),
        Some(other) => Err(TransportError::InvalidEnvelope(format!(
            "unsupported jsonrpc version {other:?}"
        ))),
        None => Err(TransportError::InvalidEnvelope(
            "missing jsonrpc version".to_owned(),
        )),
    }
}

fn check_id(object: &Map<String, Value>) -> TransportResult<()> {
    match object.get("id") {
        None | Some(Value::String(_) | Value::Number(_) | Value::Null) => Ok(()),
        Some(_) => Err(TransportError::InvalidEnvelope(
            "id must be a string, number or null".to_owned(),
        )),
    }
}

fn check_response_shape(object: &Map<String, Value>) -> TransportResult<()> {
    let has_result = object.contains_key("result");
    let has_error = object.contains_key("error");
    match (has_result, has_error) {
        (false, false) => Err(TransportError::InvalidEnvelope(
            "message has neither method nor result/error".to_owned(),
        )),
        (true, true) => Err(TransportError::InvalidEnvelope(
            "response carries both result and error".to_owned(),
        )),
        (false, true) if !object.get("error").is_some_and(Value::is_object) => Err(
            TransportError::InvalidEnvelope("error must be an object".to_owned()),
        ),
        _ if !object.contains_key("id") => Err(TransportError::InvalidEnvelope(
            "response is missing id".to_owned(),
        )),
        _ => Ok(()),
    }
}
