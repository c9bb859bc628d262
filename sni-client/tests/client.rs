use std::sync::Arc;

use sni_client::{
    ClientConfig, CommentTarget, MemoryTokenStore, NewPost, OAuthProvider, SniClient,
    SniClientError,
};

// порт 1 заведомо закрыт: любая попытка сходить в сеть дала бы `Http`
fn offline_client() -> SniClient {
    SniClient::new(
        ClientConfig::for_server("http://127.0.0.1:1"),
        Arc::new(MemoryTokenStore::new()),
    )
    .expect("client must build")
}

#[tokio::test]
async fn authorized_operations_fail_fast_without_token() {
    let client = offline_client();

    let post = NewPost {
        title: "t".to_string(),
        content: "c".to_string(),
        category: None,
    };
    assert!(matches!(
        client.create_post(&post).await,
        Err(SniClientError::Unauthorized)
    ));
    assert!(matches!(
        client
            .create_comment(CommentTarget::Snippet(1), "hi", None)
            .await,
        Err(SniClientError::Unauthorized)
    ));
    assert!(matches!(
        client.unread_count().await,
        Err(SniClientError::Unauthorized)
    ));
    assert!(matches!(client.me().await, Err(SniClientError::Unauthorized)));
}

#[tokio::test]
async fn invalid_forms_are_rejected_before_sending() {
    let client = offline_client();

    let err = client
        .signup("not-an-email", "password123", "nick")
        .await
        .expect_err("must fail");
    assert!(matches!(err, SniClientError::InvalidRequest(_)));

    let err = client.login("dev@sni.io", "").await.expect_err("must fail");
    assert!(matches!(err, SniClientError::InvalidRequest(_)));
}

#[tokio::test]
async fn unreachable_server_surfaces_http_error() {
    let client = offline_client();
    let err = client.get_post(1).await.expect_err("must fail");
    assert!(matches!(err, SniClientError::Http(_)));
}

#[test]
fn oauth_authorize_url_points_at_backend() {
    let client = SniClient::new(
        ClientConfig::for_server("https://sni.example.com/"),
        Arc::new(MemoryTokenStore::new()),
    )
    .expect("client must build");

    assert_eq!(
        client.oauth_authorize_url(OAuthProvider::Kakao),
        "https://sni.example.com/oauth2/authorization/kakao"
    );
    assert_eq!(
        client.oauth_authorize_url(OAuthProvider::Google),
        "https://sni.example.com/oauth2/authorization/google"
    );
}

#[tokio::test]
async fn oauth_error_callback_does_not_authenticate() {
    let client = offline_client();
    let err = client
        .complete_oauth_login("http://localhost:3000/oauth/callback?error=denied&message=cancelled")
        .await
        .expect_err("must fail");
    match err {
        SniClientError::Api { message, .. } => assert_eq!(message, "cancelled"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!client.session().is_authenticated());
}

#[test]
fn notification_client_uses_configured_ws_url() {
    let client = offline_client();
    let notifications = client.notifications();
    assert!(!notifications.is_connected());
    assert_eq!(client.config().ws_url, "ws://127.0.0.1:1/ws");
}
