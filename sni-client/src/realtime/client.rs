use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::sockjs::{self, SockJsFrame};
use super::stomp::{self, StompFrame};
use crate::error::{SniClientError, SniClientResult};
use crate::models::Notification;

/// Обработчик входящих уведомлений.
pub type NotificationHandler = Arc<dyn Fn(Notification) + Send + Sync>;

const USER_SUBSCRIPTION: &str = "sub-0";
const TOPIC_SUBSCRIPTION: &str = "sub-1";
const BROADCAST_TOPIC: &str = "/topic/notifications";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Результат [`NotificationClient::connect`].
pub enum ConnectOutcome {
    /// Запущено новое соединение.
    Started,
    /// Соединение для этого email уже активно, ничего не сделано.
    AlreadyConnected,
}

struct Connection {
    email: String,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    connected: Arc<AtomicBool>,
}

#[derive(Clone)]
struct Settings {
    ws_base: String,
    reconnect_delay: Duration,
    token: Option<String>,
}

#[derive(Clone)]
/// Клиент уведомлений: одно STOMP-over-SockJS соединение на email.
///
/// Подписывается на персональную очередь `/user/{email}/queue/notifications`
/// и общий топик `/topic/notifications`. При обрыве переподключается через
/// фиксированную паузу.
pub struct NotificationClient {
    settings: Settings,
    connection: Arc<Mutex<Option<Connection>>>,
}

impl std::fmt::Debug for NotificationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationClient")
            .field("ws_base", &self.settings.ws_base)
            .field("reconnect_delay", &self.settings.reconnect_delay)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl NotificationClient {
    /// Клиент для websocket-эндпоинта `ws_base` (например `ws://host/ws`).
    pub fn new(ws_base: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self {
            settings: Settings {
                ws_base: ws_base.into(),
                reconnect_delay,
                token: None,
            },
            connection: Arc::new(Mutex::new(None)),
        }
    }

    /// Access token для заголовка `Authorization` в кадре `CONNECT`.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.settings.token = token;
        self
    }

    /// Подключается и подписывается на уведомления пользователя.
    ///
    /// Повторный вызов для того же email при активном соединении ничего не
    /// делает. Вызов для другого email сначала закрывает старое соединение.
    /// Требует запущенного tokio runtime.
    pub fn connect<F>(&self, email: &str, handler: F) -> SniClientResult<ConnectOutcome>
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        let email = email.trim();
        if email.is_empty() {
            return Err(SniClientError::InvalidRequest(
                "email is required for notifications".to_string(),
            ));
        }

        let mut slot = self
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = slot.as_ref() {
            if current.email == email && !current.task.is_finished() {
                debug!(%email, "notification client already connected");
                return Ok(ConnectOutcome::AlreadyConnected);
            }
        }
        if let Some(previous) = slot.take() {
            info!(email = %previous.email, "replacing notification connection");
            let _ = previous.shutdown.send(true);
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let handler: NotificationHandler = Arc::new(handler);
        let connected = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run(
            self.settings.clone(),
            email.to_string(),
            handler,
            shutdown_rx,
            Arc::clone(&connected),
        ));
        *slot = Some(Connection {
            email: email.to_string(),
            shutdown,
            task,
            connected,
        });

        Ok(ConnectOutcome::Started)
    }

    /// Отписывается, отправляет `DISCONNECT` и закрывает соединение.
    pub async fn disconnect(&self) {
        let connection = self
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(connection) = connection else {
            return;
        };

        let _ = connection.shutdown.send(true);
        if let Err(err) = connection.task.await {
            warn!(error = %err, "notification task ended abnormally");
        }
        info!(email = %connection.email, "notifications disconnected");
    }

    /// Есть ли подтверждённое брокером (`CONNECTED`) соединение.
    pub fn is_connected(&self) -> bool {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|connection| connection.connected.load(Ordering::SeqCst))
    }
}

async fn run(
    settings: Settings,
    email: String,
    handler: NotificationHandler,
    mut shutdown: watch::Receiver<bool>,
    connected: Arc<AtomicBool>,
) {
    loop {
        let result = run_session(&settings, &email, &handler, &mut shutdown, &connected).await;
        connected.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => break,
            Err(err) => warn!(
                error = %err,
                delay_ms = settings.reconnect_delay.as_millis() as u64,
                "notification connection lost, reconnecting"
            ),
        }

        tokio::select! {
            _ = tokio::time::sleep(settings.reconnect_delay) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
        if *shutdown.borrow() {
            break;
        }
    }
    debug!(%email, "notification task stopped");
}

async fn run_session(
    settings: &Settings,
    email: &str,
    handler: &NotificationHandler,
    shutdown: &mut watch::Receiver<bool>,
    connected: &AtomicBool,
) -> SniClientResult<()> {
    let url = sockjs::session_url(&settings.ws_base);
    debug!(%url, "opening notification socket");
    let (socket, _) = tokio::select! {
        result = tokio_tungstenite::connect_async(url.as_str()) => result?,
        _ = shutdown.changed() => return Ok(()),
    };
    let (mut write, mut read) = socket.split();
    let host = stomp_host(&settings.ws_base);
    let user_queue = format!("/user/{email}/queue/notifications");
    let mut subscribed = false;

    loop {
        let incoming = tokio::select! {
            incoming = read.next() => incoming,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    if subscribed {
                        send_frame(&mut write, &StompFrame::unsubscribe(USER_SUBSCRIPTION)).await?;
                        send_frame(&mut write, &StompFrame::unsubscribe(TOPIC_SUBSCRIPTION)).await?;
                    }
                    send_frame(&mut write, &StompFrame::disconnect()).await?;
                    let _ = write.close().await;
                    return Ok(());
                }
                continue;
            }
        };

        let text = match incoming {
            Some(Ok(Message::Text(text))) => text.to_string(),
            Some(Ok(Message::Close(frame))) => {
                return Err(SniClientError::WebSocket(format!(
                    "closed by server: {frame:?}"
                )));
            }
            Some(Ok(_)) => continue,
            Some(Err(err)) => return Err(err.into()),
            None => {
                return Err(SniClientError::WebSocket(
                    "connection closed".to_string(),
                ));
            }
        };

        match sockjs::parse(&text)? {
            SockJsFrame::Open => {
                let frame = StompFrame::connect(&host, settings.token.as_deref());
                send_frame(&mut write, &frame).await?;
            }
            SockJsFrame::Heartbeat => {}
            SockJsFrame::Close { code, reason } => {
                return Err(SniClientError::WebSocket(format!(
                    "sockjs session closed: {code} {reason}"
                )));
            }
            SockJsFrame::Messages(messages) => {
                for message in messages {
                    for frame in StompFrame::decode_all(&message)? {
                        match frame.command.as_str() {
                            stomp::CONNECTED => {
                                send_frame(
                                    &mut write,
                                    &StompFrame::subscribe(USER_SUBSCRIPTION, &user_queue),
                                )
                                .await?;
                                send_frame(
                                    &mut write,
                                    &StompFrame::subscribe(TOPIC_SUBSCRIPTION, BROADCAST_TOPIC),
                                )
                                .await?;
                                subscribed = true;
                                connected.store(true, Ordering::SeqCst);
                                info!(%email, "notifications connected");
                            }
                            stomp::MESSAGE => handler(decode_notification(&frame.body)),
                            stomp::ERROR => {
                                let message = frame
                                    .header("message")
                                    .map(str::to_string)
                                    .unwrap_or_else(|| frame.body.clone());
                                return Err(SniClientError::Stomp(message));
                            }
                            stomp::RECEIPT => {}
                            other => debug!(command = other, "ignoring stomp frame"),
                        }
                    }
                }
            }
        }
    }
}

async fn send_frame<S>(write: &mut S, frame: &StompFrame) -> SniClientResult<()>
where
    S: futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let payload = sockjs::encode(&frame.encode())?;
    write.send(Message::Text(payload.into())).await?;
    Ok(())
}

fn stomp_host(ws_base: &str) -> String {
    Url::parse(ws_base)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "localhost".to_string())
}

/// Тело `MESSAGE`: объект уведомления или произвольный текст.
pub(crate) fn decode_notification(body: &str) -> Notification {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::String(text)) => Notification::from_text(text),
        Ok(value @ Value::Object(_)) => serde_json::from_value::<Notification>(value)
            .unwrap_or_else(|_| Notification::from_text(body)),
        _ => Notification::from_text(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_object_is_decoded() {
        let n = decode_notification(r#"{"id":3,"type":"LIKE","message":"liked your post"}"#);
        assert_eq!(n.id, Some(3));
        assert_eq!(n.kind.as_deref(), Some("LIKE"));
        assert_eq!(n.message, "liked your post");
    }

    #[test]
    fn plain_text_body_becomes_message() {
        let n = decode_notification("server maintenance at 3am");
        assert_eq!(n.message, "server maintenance at 3am");
        assert!(n.id.is_none());
    }

    #[test]
    fn json_string_body_is_unquoted() {
        let n = decode_notification(r#""hello""#);
        assert_eq!(n.message, "hello");
    }

    #[test]
    fn stomp_host_is_taken_from_ws_url() {
        assert_eq!(stomp_host("ws://sni.example.com:8080/ws"), "sni.example.com");
        assert_eq!(stomp_host("not a url"), "localhost");
    }

    #[tokio::test]
    async fn connect_rejects_blank_email() {
        let client = NotificationClient::new("ws://127.0.0.1:1/ws", Duration::from_millis(10));
        let err = client.connect("  ", |_| {}).expect_err("must fail");
        assert!(matches!(err, SniClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn disconnect_without_connection_is_noop() {
        let client = NotificationClient::new("ws://127.0.0.1:1/ws", Duration::from_millis(10));
        client.disconnect().await;
        assert!(!client.is_connected());
    }
}
