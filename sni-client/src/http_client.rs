use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

use crate::envelope::{decode_payload, error_message};
use crate::error::{SniClientError, SniClientResult};

#[derive(Debug, Clone)]
/// HTTP-клиент для REST API Snippethub.
///
/// Знает только о транспорте: базовый URL, таймауты, bearer-токен и разбор
/// ответа. Ресурсные операции собраны в модуле `api`.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт клиент с таймаутами по умолчанию (5 с на соединение, 15 с на запрос).
    pub fn new(base_url: impl Into<String>) -> SniClientResult<Self> {
        Self::with_timeouts(base_url, Duration::from_secs(5), Duration::from_secs(15))
    }

    /// Создаёт клиент с заданными таймаутами.
    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> SniClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(SniClientError::from_reqwest)?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Базовый URL сервера.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = self.endpoint(path);
        debug!(%method, %url, authorized = token.is_some(), "api request");
        let request = self.client.request(method, url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute<TRes>(&self, request: RequestBuilder) -> SniClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let response = request.send().await.map_err(SniClientError::from_reqwest)?;
        let status = response.status();
        let body = response.bytes().await.map_err(SniClientError::from_reqwest)?;

        if !status.is_success() {
            debug!(%status, "api request failed");
            return Err(SniClientError::from_http_status(status, error_message(&body)));
        }

        decode_payload(status, &body)
    }

    /// GET с query-параметрами.
    pub(crate) async fn get<TQuery, TRes>(
        &self,
        path: &str,
        query: Option<&TQuery>,
        token: Option<&str>,
    ) -> SniClientResult<TRes>
    where
        TQuery: Serialize + ?Sized,
        TRes: DeserializeOwned,
    {
        let mut request = self.request(Method::GET, path, token);
        if let Some(query) = query {
            request = request.query(query);
        }
        self.execute(request).await
    }

    /// универсальный helper для отправки запросов с json-payload
    pub(crate) async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
        token: Option<&str>,
    ) -> SniClientResult<TRes>
    where
        TReq: Serialize + ?Sized,
        TRes: DeserializeOwned,
    {
        let request = self.request(method, path, token).json(body);
        self.execute(request).await
    }

    /// Запрос без тела (DELETE, POST-переключатели лайков и т.п.).
    pub(crate) async fn send_empty<TRes>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> SniClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let request = self.request(method, path, token);
        self.execute(request).await
    }

    /// multipart/form-data POST.
    pub(crate) async fn send_multipart<TRes>(
        &self,
        path: &str,
        form: Form,
        token: Option<&str>,
    ) -> SniClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let request = self.request(Method::POST, path, token).multipart(form);
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = HttpClient::new("http://localhost:8080/").expect("client must build");
        let full = client.endpoint("/api/posts");
        assert_eq!(full, "http://localhost:8080/api/posts");
    }

    #[test]
    fn endpoint_joins_paths_without_leading_slash() {
        let client = HttpClient::new("http://localhost:8080").expect("client must build");
        assert_eq!(
            client.endpoint("api/snippets/3"),
            "http://localhost:8080/api/snippets/3"
        );
    }
}
