//! Уведомления в реальном времени: STOMP поверх SockJS websocket.

pub(crate) mod client;
mod sockjs;
pub(crate) mod stomp;
