use reqwest::Method;

use crate::error::SniClientResult;
use crate::models::Notification;
use crate::SniClient;

impl SniClient {
    /// Уведомления текущего пользователя, новые первыми.
    pub async fn list_notifications(&self) -> SniClientResult<Vec<Notification>> {
        let token = self.require_token()?;
        self.http
            .get::<(), _>("/api/notifications", None, Some(&token))
            .await
    }

    /// Количество непрочитанных уведомлений.
    ///
    /// Эндпоинт отвечает голым числом, без конверта.
    pub async fn unread_count(&self) -> SniClientResult<u64> {
        let token = self.require_token()?;
        self.http
            .get::<(), _>("/api/notifications/unread-count", None, Some(&token))
            .await
    }

    /// Отмечает уведомление прочитанным.
    pub async fn mark_notification_read(&self, id: i64) -> SniClientResult<()> {
        let token = self.require_token()?;
        let _: Option<serde_json::Value> = self
            .http
            .send_empty(
                Method::PUT,
                &format!("/api/notifications/{id}/read"),
                Some(&token),
            )
            .await?;
        Ok(())
    }

    /// Отмечает все уведомления прочитанными.
    pub async fn mark_all_notifications_read(&self) -> SniClientResult<()> {
        let token = self.require_token()?;
        let _: Option<serde_json::Value> = self
            .http
            .send_empty(Method::PUT, "/api/notifications/read-all", Some(&token))
            .await?;
        Ok(())
    }

    /// Удаляет уведомление.
    pub async fn delete_notification(&self, id: i64) -> SniClientResult<()> {
        let token = self.require_token()?;
        let _: Option<serde_json::Value> = self
            .http
            .send_empty(
                Method::DELETE,
                &format!("/api/notifications/{id}"),
                Some(&token),
            )
            .await?;
        Ok(())
    }
}
