//! Remote session service.
//!
//! `POST {base_url}{sessions_path}` submits one record, `GET` on the same
//! path returns every record of the authenticated owner. Any non-2xx status
//! is a failure.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::record::{FocusSessionRecord, SessionDraft};
use crate::error::RemoteError;
use crate::storage::RemoteConfig;

/// Where completed sessions go when the user is signed in.
pub trait SessionService: Send + Sync {
    /// A bearer token is available.
    fn is_authenticated(&self) -> bool;

    /// Store one record; the returned record carries the canonical id.
    fn submit(
        &self,
        draft: &SessionDraft,
    ) -> impl Future<Output = Result<FocusSessionRecord, RemoteError>> + Send;

    fn fetch_all(
        &self,
    ) -> impl Future<Output = Result<Vec<FocusSessionRecord>, RemoteError>> + Send;
}

/// JSON-over-HTTP session service with bearer auth.
#[derive(Debug, Clone)]
pub struct HttpSessionService {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpSessionService {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let endpoint = Url::parse(&config.base_url)?.join(&config.sessions_path)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        let token = config
            .is_authenticated()
            .then(|| config.token.trim().to_string());
        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn token(&self) -> Result<&str, RemoteError> {
        self.token.as_deref().ok_or(RemoteError::NotAuthenticated)
    }
}

impl SessionService for HttpSessionService {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    async fn submit(&self, draft: &SessionDraft) -> Result<FocusSessionRecord, RemoteError> {
        let token = self.token()?;
        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .json(draft)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }
        let record = resp
            .json::<FocusSessionRecord>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(record)
    }

    async fn fetch_all(&self) -> Result<Vec<FocusSessionRecord>, RemoteError> {
        let token = self.token()?;
        let resp = self
            .client
            .get(self.endpoint.clone())
            .bearer_auth(token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }
        resp.json::<Vec<FocusSessionRecord>>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// Service for a profile that never signs in.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineService;

impl SessionService for OfflineService {
    fn is_authenticated(&self) -> bool {
        false
    }

    async fn submit(&self, _draft: &SessionDraft) -> Result<FocusSessionRecord, RemoteError> {
        Err(RemoteError::NotAuthenticated)
    }

    async fn fetch_all(&self) -> Result<Vec<FocusSessionRecord>, RemoteError> {
        Err(RemoteError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SessionKind;

    fn config(base_url: &str, token: &str) -> RemoteConfig {
        RemoteConfig {
            base_url: base_url.to_string(),
            token: token.to_string(),
            ..RemoteConfig::default()
        }
    }

    #[test]
    fn endpoint_joins_path() {
        let svc = HttpSessionService::new(&config("http://example.test:5000", "t")).unwrap();
        assert_eq!(svc.endpoint().as_str(), "http://example.test:5000/api/focus-sessions");
        assert!(svc.is_authenticated());

        let anon = HttpSessionService::new(&config("http://example.test", "  ")).unwrap();
        assert!(!anon.is_authenticated());
    }

    #[test]
    fn rejects_malformed_base_url() {
        let err = HttpSessionService::new(&config("not a url", "t")).unwrap_err();
        assert!(matches!(err, RemoteError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn submit_posts_draft_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/focus-sessions")
            .match_header("authorization", "Bearer tok-1")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "duration": 25,
                "type": "work"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"_id":"srv-1","date":"2026-05-04T10:00:00Z","duration":25,"type":"work"}"#)
            .create_async()
            .await;

        let svc = HttpSessionService::new(&config(&server.url(), "tok-1")).unwrap();
        let date = "2026-05-04T10:00:00Z".parse().unwrap();
        let draft = SessionDraft::new(SessionKind::Work, 25, date);
        let record = svc.submit(&draft).await.unwrap();

        assert_eq!(record.id, "srv-1");
        assert_eq!(record.duration, 25);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/focus-sessions")
            .with_status(500)
            .create_async()
            .await;

        let svc = HttpSessionService::new(&config(&server.url(), "tok")).unwrap();
        let draft = SessionDraft::new(SessionKind::Break, 5, chrono::Utc::now());
        let err = svc.submit(&draft).await.unwrap_err();
        assert!(matches!(err, RemoteError::Status { status: 500 }));
    }

    #[tokio::test]
    async fn fetch_all_decodes_array() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/focus-sessions")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"_id":"a","date":"2026-05-01T08:00:00Z","duration":25,"type":"work"},
                    {"_id":"b","date":"2026-05-01T08:25:00Z","duration":5,"type":"break"}]"#,
            )
            .create_async()
            .await;

        let svc = HttpSessionService::new(&config(&server.url(), "tok")).unwrap();
        let records = svc.fetch_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].kind, SessionKind::Break);
    }

    #[tokio::test]
    async fn unauthenticated_submit_never_hits_network() {
        let svc = HttpSessionService::new(&config("http://127.0.0.1:9", "")).unwrap();
        let draft = SessionDraft::new(SessionKind::Work, 25, chrono::Utc::now());
        assert!(matches!(
            svc.submit(&draft).await,
            Err(RemoteError::NotAuthenticated)
        ));
    }
}
