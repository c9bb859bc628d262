//! Кадры STOMP 1.2 (текстовые, в том виде, как их переносит SockJS).

use crate::error::{SniClientError, SniClientResult};

pub(crate) const CONNECT: &str = "CONNECT";
pub(crate) const CONNECTED: &str = "CONNECTED";
pub(crate) const SUBSCRIBE: &str = "SUBSCRIBE";
pub(crate) const UNSUBSCRIBE: &str = "UNSUBSCRIBE";
pub(crate) const DISCONNECT: &str = "DISCONNECT";
pub(crate) const MESSAGE: &str = "MESSAGE";
pub(crate) const ERROR: &str = "ERROR";
pub(crate) const RECEIPT: &str = "RECEIPT";

#[derive(Debug, Clone, PartialEq, Eq)]
/// STOMP-кадр: команда, заголовки в порядке следования и тело.
pub struct StompFrame {
    /// Команда (`CONNECT`, `MESSAGE`, ...).
    pub command: String,
    /// Заголовки; при повторе имени значащим считается первый.
    pub headers: Vec<(String, String)>,
    /// Тело кадра.
    pub body: String,
}

impl StompFrame {
    /// Кадр без заголовков и тела.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Добавляет заголовок.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Задаёт тело.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Значение заголовка по имени.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn connect(host: &str, token: Option<&str>) -> Self {
        let frame = Self::new(CONNECT)
            .with_header("accept-version", "1.2")
            .with_header("host", host)
            .with_header("heart-beat", "0,0");
        match token {
            Some(token) => frame.with_header("Authorization", format!("Bearer {token}")),
            None => frame,
        }
    }

    pub(crate) fn subscribe(id: &str, destination: &str) -> Self {
        Self::new(SUBSCRIBE)
            .with_header("id", id)
            .with_header("destination", destination)
    }

    pub(crate) fn unsubscribe(id: &str) -> Self {
        Self::new(UNSUBSCRIBE).with_header("id", id)
    }

    pub(crate) fn disconnect() -> Self {
        Self::new(DISCONNECT)
    }

    /// Сериализует кадр, завершая его NUL-октетом.
    ///
    /// Заголовки `CONNECT`/`CONNECTED` не экранируются.
    pub fn encode(&self) -> String {
        let escape = !is_unescaped_command(&self.command);
        let mut out = String::with_capacity(self.command.len() + self.body.len() + 32);
        out.push_str(&self.command);
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        if !self.body.is_empty() && self.header("content-length").is_none() {
            out.push_str(&format!("content-length:{}\n", self.body.len()));
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Разбирает все кадры из строки; heart-beat (пустые строки) пропускаются.
    pub fn decode_all(raw: &str) -> SniClientResult<Vec<Self>> {
        let mut frames = Vec::new();
        let mut rest = raw;
        loop {
            rest = rest.trim_start_matches(['\r', '\n']);
            if rest.is_empty() {
                break;
            }
            let (frame, tail) = decode_one(rest)?;
            frames.push(frame);
            rest = tail;
        }
        Ok(frames)
    }
}

fn is_unescaped_command(command: &str) -> bool {
    command == CONNECT || command == CONNECTED
}

fn decode_one(raw: &str) -> SniClientResult<(StompFrame, &str)> {
    let (head, after_head) = split_head(raw)
        .ok_or_else(|| SniClientError::Stomp("frame has no header terminator".to_string()))?;

    let mut lines = head.lines().map(|line| line.trim_end_matches('\r'));
    let command = lines
        .next()
        .map(str::trim)
        .filter(|command| !command.is_empty())
        .ok_or_else(|| SniClientError::Stomp("frame has no command".to_string()))?
        .to_string();
    let unescape = !is_unescaped_command(&command);

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| SniClientError::Stomp(format!("malformed header line: {line}")))?;
        if unescape {
            headers.push((unescape_header(name)?, unescape_header(value)?));
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .map(|(_, value)| {
            value
                .trim()
                .parse::<usize>()
                .map_err(|_| SniClientError::Stomp(format!("invalid content-length: {value}")))
        })
        .transpose()?;

    let (body, tail) = match content_length {
        Some(len) => {
            let body = after_head.get(..len).ok_or_else(|| {
                SniClientError::Stomp("body is shorter than content-length".to_string())
            })?;
            let tail = &after_head[len..];
            (body, tail.strip_prefix('\0').unwrap_or(tail))
        }
        None => match after_head.split_once('\0') {
            Some((body, tail)) => (body, tail),
            None => (after_head, ""),
        },
    };

    Ok((
        StompFrame {
            command,
            headers,
            body: body.to_string(),
        },
        tail,
    ))
}

fn split_head(raw: &str) -> Option<(&str, &str)> {
    let lf = raw.find("\n\n").map(|idx| (idx, 2));
    let crlf = raw.find("\r\n\r\n").map(|idx| (idx, 4));
    let (idx, sep) = match (lf, crlf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some((&raw[..idx], &raw[idx + sep..]))
}

fn escape_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(value: &str) -> SniClientResult<String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => {
                return Err(SniClientError::Stomp(format!(
                    "invalid header escape: \\{}",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_frame_carries_bearer_token_unescaped() {
        let raw = StompFrame::connect("localhost", Some("a:b")).encode();
        assert!(raw.starts_with("CONNECT\naccept-version:1.2\nhost:localhost\n"));
        assert!(raw.contains("Authorization:Bearer a:b\n"));
        assert!(raw.ends_with("\n\n\0"));
    }

    #[test]
    fn subscribe_frame_escapes_header_values() {
        let raw = StompFrame::subscribe("sub-0", "/topic/a:b").encode();
        assert_eq!(raw, "SUBSCRIBE\nid:sub-0\ndestination:/topic/a\\cb\n\n\0");
    }

    #[test]
    fn message_frame_is_decoded_with_unescaped_headers() {
        let raw = "MESSAGE\ndestination:/user/a@b.c/queue/notifications\nsubscription:sub-0\nx-note:line\\nnext\n\n{\"message\":\"hi\"}\0";
        let frames = StompFrame::decode_all(raw).expect("must decode");
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.command, MESSAGE);
        assert_eq!(frame.header("subscription"), Some("sub-0"));
        assert_eq!(frame.header("x-note"), Some("line\nnext"));
        assert_eq!(frame.body, "{\"message\":\"hi\"}");
    }

    #[test]
    fn content_length_limits_body_and_allows_following_frames() {
        let raw = "MESSAGE\ncontent-length:3\n\na\0b\0\nRECEIPT\nreceipt-id:7\n\n\0";
        let frames = StompFrame::decode_all(raw).expect("must decode");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].body, "a\0b");
        assert_eq!(frames[1].command, RECEIPT);
        assert_eq!(frames[1].header("receipt-id"), Some("7"));
    }

    #[test]
    fn heartbeats_decode_to_nothing() {
        assert!(StompFrame::decode_all("\n").expect("must decode").is_empty());
        assert!(StompFrame::decode_all("\r\n\n").expect("must decode").is_empty());
    }

    #[test]
    fn first_repeated_header_wins() {
        let raw = "MESSAGE\nfoo:first\nfoo:second\n\n\0";
        let frames = StompFrame::decode_all(raw).expect("must decode");
        assert_eq!(frames[0].header("foo"), Some("first"));
    }

    #[test]
    fn frame_without_header_terminator_is_rejected() {
        let err = StompFrame::decode_all("MESSAGE\nfoo:bar").expect_err("must fail");
        assert!(matches!(err, SniClientError::Stomp(_)));
    }

    #[test]
    fn invalid_escape_is_rejected() {
        let err = StompFrame::decode_all("ERROR\nmessage:bad\\t\n\n\0").expect_err("must fail");
        assert!(matches!(err, SniClientError::Stomp(_)));
    }

    #[test]
    fn encoded_body_gets_content_length() {
        let raw = StompFrame::new("SEND")
            .with_header("destination", "/app/x")
            .with_body("hello")
            .encode();
        assert!(raw.contains("content-length:5\n"));
        let frames = StompFrame::decode_all(&raw).expect("must decode");
        assert_eq!(frames[0].body, "hello");
    }
}
