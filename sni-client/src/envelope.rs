//! Разбор ответов бэкенда.
//!
//! Часть эндпоинтов отвечает конвертом `{success, message, data}`, часть
//! отдаёт голый payload (массив, число, объект). Оба варианта проходят через
//! [`decode_payload`].

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{SniClientError, SniClientResult};

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Разворачивает тело успешного ответа в `T`.
///
/// Объект с булевым полем `success` считается конвертом: при `success: false`
/// возвращается [`SniClientError::Api`] с сообщением из `message`, иначе
/// декодируется `data` (отсутствующее `data` читается как `null`). Любое
/// другое тело декодируется целиком.
pub(crate) fn decode_payload<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> SniClientResult<T> {
    let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(body)?
    };

    let payload = match as_envelope(&value) {
        Some(envelope) if !envelope.success => {
            return Err(SniClientError::Api {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }
        Some(envelope) => envelope.data.unwrap_or(Value::Null),
        None => value,
    };

    serde_json::from_value(payload).map_err(SniClientError::from)
}

/// Достаёт человекочитаемое сообщение из тела ошибки.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    let parsed = serde_json::from_slice::<ErrorBody>(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

fn as_envelope(value: &Value) -> Option<ApiEnvelope> {
    let object = value.as_object()?;
    if !object.get("success").is_some_and(Value::is_boolean) {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}
