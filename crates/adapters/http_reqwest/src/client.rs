//! Shared REST plumbing: URL building, bearer auth and response checks.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use plugdash_app::ports::TokenStore;
use plugdash_domain::error::{NotFoundError, PlugDashError};

use crate::error::{HttpError, error_detail};

/// Backend address used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Per-request timeout used when nothing is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client for the plug backend.
///
/// The bearer token is read from the [`TokenStore`] before every request,
/// so a login or logout through the same store takes effect immediately.
pub struct HttpApiClient<T> {
    base_url: Url,
    http: reqwest::Client,
    tokens: T,
}

impl<T> HttpApiClient<T> {
    /// Build a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidBaseUrl`] when the URL does not parse or
    /// cannot carry a path, and [`HttpError::Transport`] when the TLS backend
    /// fails to initialise.
    pub fn new(base_url: &str, timeout: Duration, tokens: T) -> Result<Self, HttpError> {
        let parsed = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|_| HttpError::InvalidBaseUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(HttpError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: parsed,
            http,
            tokens,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    /// Append percent-encoded path segments to the base URL.
    ///
    /// A trailing empty segment produces a trailing slash.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// A request with no bearer token attached.
    pub(crate) fn anonymous(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, %url, "backend request");
        self.http.request(method, url)
    }
}

impl<T: TokenStore + Sync> HttpApiClient<T> {
    /// A request carrying the stored bearer token, when there is one.
    pub(crate) async fn authorized(
        &self,
        method: Method,
        url: Url,
    ) -> Result<RequestBuilder, PlugDashError> {
        let request = self.anonymous(method, url);
        Ok(match self.tokens.load().await? {
            Some(token) => request.bearer_auth(token.secret()),
            None => request,
        })
    }

    pub(crate) async fn get_json<R: DeserializeOwned>(
        &self,
        url: Url,
        lookup: Option<NotFoundError>,
    ) -> Result<R, PlugDashError> {
        self.fetch_json(Method::GET, url, lookup).await
    }

    /// Bodiless request with a JSON answer.
    pub(crate) async fn fetch_json<R: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        lookup: Option<NotFoundError>,
    ) -> Result<R, PlugDashError> {
        let request = self.authorized(method, url).await?;
        Ok(read_json(send(request, lookup).await?).await?)
    }

    pub(crate) async fn send_json<B, R>(
        &self,
        method: Method,
        url: Url,
        body: &B,
        lookup: Option<NotFoundError>,
    ) -> Result<R, PlugDashError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.authorized(method, url).await?.json(body);
        Ok(read_json(send(request, lookup).await?).await?)
    }

    /// Send a request whose response body is irrelevant.
    pub(crate) async fn send_empty(
        &self,
        method: Method,
        url: Url,
        lookup: Option<NotFoundError>,
    ) -> Result<(), PlugDashError> {
        let request = self.authorized(method, url).await?;
        send(request, lookup).await?;
        Ok(())
    }
}

/// Send the request and turn non-2xx answers into [`HttpError`].
///
/// A 404 becomes [`HttpError::NotFound`] when the caller named the record it
/// was looking up; otherwise it is reported like any other status.
pub(crate) async fn send(
    request: RequestBuilder,
    lookup: Option<NotFoundError>,
) -> Result<Response, HttpError> {
    let response = request.send().await?;
    let status = response.status();
    tracing::debug!(status = status.as_u16(), "backend response");
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match (status, lookup) {
        (StatusCode::UNAUTHORIZED, _) => Err(HttpError::Unauthorized),
        (StatusCode::NOT_FOUND, Some(lookup)) => Err(HttpError::NotFound(lookup)),
        _ => Err(HttpError::Status {
            status: status.as_u16(),
            detail: error_detail(&body),
        }),
    }
}

pub(crate) async fn read_json<R: DeserializeOwned>(response: Response) -> Result<R, HttpError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
