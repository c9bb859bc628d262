//! Кадры SockJS для транспорта `websocket`.

use serde_json::Value;

use crate::error::{SniClientError, SniClientResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SockJsFrame {
    Open,
    Heartbeat,
    Messages(Vec<String>),
    Close { code: u16, reason: String },
}

/// URL сырого websocket-транспорта SockJS:
/// `{base}/{server_id}/{session_id}/websocket`.
pub(crate) fn session_url(ws_base: &str) -> String {
    let server_id = rand::random::<u16>() % 1000;
    let session_id = rand::random::<u64>();
    format!(
        "{}/{server_id:03}/{session_id:016x}/websocket",
        ws_base.trim_end_matches('/')
    )
}

pub(crate) fn parse(raw: &str) -> SniClientResult<SockJsFrame> {
    let mut chars = raw.chars();
    let kind = chars
        .next()
        .ok_or_else(|| SniClientError::Stomp("empty sockjs frame".to_string()))?;
    let payload = chars.as_str();

    match kind {
        'o' => Ok(SockJsFrame::Open),
        'h' => Ok(SockJsFrame::Heartbeat),
        'a' => {
            let messages: Vec<String> = serde_json::from_str(payload)
                .map_err(|err| SniClientError::Stomp(format!("invalid sockjs array: {err}")))?;
            Ok(SockJsFrame::Messages(messages))
        }
        'm' => {
            let message: String = serde_json::from_str(payload)
                .map_err(|err| SniClientError::Stomp(format!("invalid sockjs message: {err}")))?;
            Ok(SockJsFrame::Messages(vec![message]))
        }
        'c' => {
            let value: Value = serde_json::from_str(payload)
                .map_err(|err| SniClientError::Stomp(format!("invalid sockjs close: {err}")))?;
            let code = value
                .get(0)
                .and_then(Value::as_u64)
                .and_then(|code| u16::try_from(code).ok())
                .unwrap_or(0);
            let reason = value
                .get(1)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Ok(SockJsFrame::Close { code, reason })
        }
        other => Err(SniClientError::Stomp(format!(
            "unknown sockjs frame type: {other}"
        ))),
    }
}

/// Исходящие сообщения SockJS передаются JSON-массивом строк.
pub(crate) fn encode(message: &str) -> SniClientResult<String> {
    serde_json::to_string(&[message]).map_err(SniClientError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_url_has_sockjs_shape() {
        let url = session_url("ws://localhost:8080/ws/");
        let rest = url
            .strip_prefix("ws://localhost:8080/ws/")
            .expect("base must be kept");
        let parts: Vec<&str> = rest.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 3);
        assert_eq!(parts[1].len(), 16);
        assert_eq!(parts[2], "websocket");
    }

    #[test]
    fn control_frames_are_recognized() {
        assert_eq!(parse("o").expect("must parse"), SockJsFrame::Open);
        assert_eq!(parse("h").expect("must parse"), SockJsFrame::Heartbeat);
    }

    #[test]
    fn array_frame_yields_messages() {
        let frame = parse(r#"a["CONNECTED\nversion:1.2\n\n\u0000","x"]"#).expect("must parse");
        assert_eq!(
            frame,
            SockJsFrame::Messages(vec![
                "CONNECTED\nversion:1.2\n\n\0".to_string(),
                "x".to_string()
            ])
        );
    }

    #[test]
    fn close_frame_yields_code_and_reason() {
        let frame = parse(r#"c[3000,"Go away!"]"#).expect("must parse");
        assert_eq!(
            frame,
            SockJsFrame::Close {
                code: 3000,
                reason: "Go away!".to_string()
            }
        );
    }

    #[test]
    fn unknown_and_broken_frames_are_errors() {
        assert!(parse("").is_err());
        assert!(parse("z").is_err());
        assert!(parse("a[broken").is_err());
    }

    #[test]
    fn outgoing_message_is_json_array() {
        let raw = encode("SUBSCRIBE\nid:sub-0\n\n\0").expect("must encode");
        assert_eq!(raw, r#"["SUBSCRIBE\nid:sub-0\n\n\u0000"]"#);
    }
}
