//! HTTP access to the chat backend.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{
    AskRequest, AskResponse, ErrorBody, ProcessResponse, Session, SessionDetail, SessionDocument,
    SessionId, UrlRequest,
};
use crate::config::ApiConfig;

/// Boxed future type for backend operations.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Operations the controller needs from the backend.
pub trait Backend: Send + Sync {
    /// `GET /sessions`: every known session, newest first.
    fn list_sessions(&self) -> BackendFuture<'_, ApiResult<Vec<Session>>>;

    /// `GET /session/{id}`: a session's transcript.
    fn session_detail<'a>(&'a self, id: &'a SessionId)
    -> BackendFuture<'a, ApiResult<SessionDetail>>;

    /// `POST /process-url`: crawl a URL into a new session and wait for it.
    fn process_url<'a>(&'a self, url: &'a str) -> BackendFuture<'a, ApiResult<Session>>;

    /// `POST /load-url`: start crawling a URL for the single legacy session.
    fn load_url<'a>(&'a self, url: &'a str) -> BackendFuture<'a, ApiResult<()>>;

    /// `POST /ask`: answer a question, within a session unless in legacy mode.
    fn ask<'a>(
        &'a self,
        session_id: Option<&'a SessionId>,
        question: &'a str,
    ) -> BackendFuture<'a, ApiResult<String>>;
}

/// [`Backend`] implementation speaking JSON over HTTP.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend client with the given configuration.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        // Endpoint joins are relative, keep any path prefix of the base.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            client: Self::build_client(config)?,
        })
    }

    fn build_client(config: &ApiConfig) -> ApiResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        builder
            .build()
            .map_err(|e| ApiError::Transport(format!("cannot build HTTP client: {e}")))
    }

    /// Base address endpoints are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.endpoint(path)?;
        tracing::debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        tracing::debug!("POST {url}");
        let response = self.client.post(url).json(body).send().await?;
        decode(response).await
    }
}

/// Turn a response into either its decoded body or an [`ApiError`].
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // The body is read best-effort; an unreadable or non-JSON body still
    // yields an application error so flows fall back to their own wording.
    let detail = response
        .bytes()
        .await
        .ok()
        .and_then(|bytes| serde_json::from_slice::<ErrorBody>(&bytes).ok())
        .and_then(|body| body.detail_text());

    Err(ApiError::Application {
        status: status.as_u16(),
        detail,
    })
}

impl Backend for HttpBackend {
    fn list_sessions(&self) -> BackendFuture<'_, ApiResult<Vec<Session>>> {
        Box::pin(async move { self.get_json("sessions").await })
    }

    fn session_detail<'a>(
        &'a self,
        id: &'a SessionId,
    ) -> BackendFuture<'a, ApiResult<SessionDetail>> {
        Box::pin(async move {
            let mut url = self.endpoint("session/")?;
            url.path_segments_mut()
                .map_err(|()| ApiError::Transport(format!("cannot address session {id}")))?
                .pop_if_empty()
                .push(id.as_str());
            tracing::debug!("GET {url}");
            let response = self.client.get(url).send().await?;
            let document: SessionDocument = decode(response).await?;
            Ok(document.into_detail(id))
        })
    }

    fn process_url<'a>(&'a self, url: &'a str) -> BackendFuture<'a, ApiResult<Session>> {
        Box::pin(async move {
            let body = UrlRequest {
                url: url.to_string(),
            };
            let created: ProcessResponse = self.post_json("process-url", &body).await?;
            if let Some(message) = &created.message {
                tracing::debug!("process-url: {message}");
            }
            Ok(created.into())
        })
    }

    fn load_url<'a>(&'a self, url: &'a str) -> BackendFuture<'a, ApiResult<()>> {
        Box::pin(async move {
            let body = UrlRequest {
                url: url.to_string(),
            };
            let endpoint = self.endpoint("load-url")?;
            tracing::debug!("POST {endpoint}");
            let response = self.client.post(endpoint).json(&body).send().await?;
            // Any 2xx is accepted, the body is ignored.
            check_status(response).await.map(drop)
        })
    }

    fn ask<'a>(
        &'a self,
        session_id: Option<&'a SessionId>,
        question: &'a str,
    ) -> BackendFuture<'a, ApiResult<String>> {
        Box::pin(async move {
            let body = AskRequest {
                session_id: session_id.cloned(),
                question: question.to_string(),
            };
            let answer: AskResponse = self.post_json("ask", &body).await?;
            Ok(answer.answer)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use super::*;
    use crate::server::{self, StubState};

    async fn spawn_stub() -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(server::serve(
            listener,
            Arc::new(StubState::new()),
            std::future::pending(),
        ));
        addr
    }

    fn backend_for(addr: SocketAddr) -> HttpBackend {
        let config = ApiConfig {
            base_url: format!("http://{addr}"),
            ..ApiConfig::default()
        };
        HttpBackend::new(&config).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/api".to_string(),
            ..ApiConfig::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.base_url().as_str(), "http://localhost:8000/api/");
        assert_eq!(
            backend.endpoint("sessions").map(|u| u.to_string()),
            Ok("http://localhost:8000/api/sessions".to_string())
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ApiConfig {
            base_url: "::nope".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(
            HttpBackend::new(&config),
            Err(ApiError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_process_then_list_and_fetch() {
        let backend = backend_for(spawn_stub().await);

        let session = backend.process_url("https://example.com/docs").await.unwrap();
        assert_eq!(session.title, "example.com");

        let listed = backend.list_sessions().await.unwrap();
        assert_eq!(listed, vec![session.clone()]);

        let answer = backend.ask(Some(&session.id), "What is it?").await.unwrap();
        assert!(answer.contains("What is it?"));

        let detail = backend.session_detail(&session.id).await.unwrap();
        assert_eq!(detail.session.id, session.id);
        assert_eq!(detail.source_url.as_deref(), Some("https://example.com/docs"));
        assert_eq!(detail.conversation.len(), 1);
        assert_eq!(detail.conversation[0].question, "What is it?");
    }

    #[tokio::test]
    async fn test_application_error_carries_detail() {
        let backend = backend_for(spawn_stub().await);

        let err = backend.process_url("not a url").await;
        assert!(matches!(
            err,
            Err(ApiError::Application { status: 400, detail: Some(ref d) }) if d.starts_with("Invalid URL")
        ));

        let missing = backend
            .ask(Some(&SessionId::from("nope")), "hello?")
            .await;
        assert_eq!(missing, Err(ApiError::application(404, "Session not found.")));
    }

    #[tokio::test]
    async fn test_legacy_endpoints() {
        let backend = backend_for(spawn_stub().await);

        let early = backend.ask(None, "anything?").await;
        assert!(matches!(early, Err(ApiError::Application { status: 400, .. })));

        assert_eq!(backend.load_url("https://example.org").await, Ok(()));
        let answer = backend.ask(None, "anything?").await.unwrap();
        assert!(answer.contains("example.org"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let backend = backend_for(addr);

        let err = backend.list_sessions().await;
        assert!(matches!(err, Err(ApiError::Transport(_))), "{err:?}");
        let err = backend.load_url("https://example.com").await;
        assert!(err.is_err_and(|e| e.is_transport()));
    }
}
