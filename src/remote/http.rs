//! reqwest-backed collection endpoint.
//!
//! # Security Note - Logging
//!
//! The bearer token is wrapped in `BearerHeader`, whose `Display` and `Debug`
//! implementations print `[REDACTED]`, and the header value is marked
//! sensitive so reqwest never logs it.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::resources::Resource;

use super::error::{ErrorBody, classify_transport_error};
use super::{CollectionEndpoint, ListQuery, Page, Transition, TransitionBody};

/// Wrapper for the Authorization header that redacts the token when formatted.
struct BearerHeader<'a> {
    token: &'a SecretString,
}

impl<'a> BearerHeader<'a> {
    fn new(token: &'a SecretString) -> Self {
        Self { token }
    }

    fn as_header_value(&self) -> Result<HeaderValue> {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {}", self.token.expose_secret())).map_err(
                |_| DeskError::Config("access token contains invalid characters".to_string()),
            )?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for BearerHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bearer [REDACTED]")
    }
}

impl fmt::Debug for BearerHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerHeader")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Mutation responses come back either bare or wrapped in `{"data": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

/// HTTP collection endpoint for resource `R`, rooted at the API base URL.
pub struct HttpCollection<R> {
    client: Client,
    base_url: Url,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpCollection<R> {
    /// Create an endpoint with an explicit base URL and request timeout
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| DeskError::Other(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            _resource: PhantomData,
        })
    }

    /// Create an endpoint from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.base_url()?, config.timeout())
    }

    /// `{base}/{path}/`
    pub fn collection_url(&self) -> Result<Url> {
        Ok(self.base_url.join(&format!("{}/", R::PATH))?)
    }

    /// `{base}/{path}/{id}/`, with `id` percent-encoded as one segment
    pub fn item_url(&self, id: &str) -> Result<Url> {
        let mut url = self.collection_url()?;
        url.path_segments_mut()
            .map_err(|_| DeskError::Config("API base URL cannot hold paths".to_string()))?
            .pop_if_empty()
            .push(id)
            .push("");
        Ok(url)
    }

    fn transition_url(&self, id: &str, transition: &Transition) -> Result<Url> {
        let mut url = self.item_url(id)?;
        url.path_segments_mut()
            .map_err(|_| DeskError::Config("API base URL cannot hold paths".to_string()))?
            .pop_if_empty()
            .push(transition.action())
            .push("");
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        token: &SecretString,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response> {
        let auth = BearerHeader::new(token);
        let path = url.path().to_string();
        tracing::debug!(%method, %path, %auth, resource = R::NAME, "sending admin api request");

        let request = self
            .client
            .request(method.clone(), url)
            .header(header::AUTHORIZATION, auth.as_header_value()?)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"));

        let response = build(request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        tracing::debug!(%method, %path, status = status.as_u16(), "admin api response");

        if !status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            return Err(ErrorBody::parse(&bytes).into_error(status));
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(classify_transport_error)?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(resource = R::NAME, "undecodable response body: {e}");
            DeskError::Rejected {
                status: status.as_u16(),
                message: Some("The server returned an unexpected response.".to_string()),
                field_errors: Default::default(),
            }
        })?;
        Ok(envelope.into_inner())
    }
}

#[async_trait]
impl<R: Resource> CollectionEndpoint<R> for HttpCollection<R> {
    async fn list(&self, token: &SecretString, query: &ListQuery) -> Result<Page<R::Item>> {
        let pairs = query.to_pairs();
        let response = self
            .send(Method::GET, self.collection_url()?, token, |req| {
                req.query(&pairs)
            })
            .await?;
        Self::decode(response).await
    }

    async fn create(&self, token: &SecretString, draft: &R::Draft) -> Result<R::Item> {
        let response = self
            .send(Method::POST, self.collection_url()?, token, |req| {
                req.json(draft)
            })
            .await?;
        Self::decode(response).await
    }

    async fn update(&self, token: &SecretString, id: &str, patch: &R::Patch) -> Result<R::Item> {
        let response = self
            .send(Method::PATCH, self.item_url(id)?, token, |req| req.json(patch))
            .await?;
        Self::decode(response).await
    }

    async fn delete(&self, token: &SecretString, id: &str) -> Result<()> {
        self.send(Method::DELETE, self.item_url(id)?, token, |req| req)
            .await?;
        Ok(())
    }

    async fn transition(
        &self,
        token: &SecretString,
        id: &str,
        transition: &Transition,
    ) -> Result<R::Item> {
        let body = TransitionBody {
            reason: transition.reason(),
        };
        let response = self
            .send(
                Method::POST,
                self.transition_url(id, transition)?,
                token,
                |req| req.json(&body),
            )
            .await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::listings::Listings;

    fn endpoint() -> HttpCollection<Listings> {
        let base = Url::parse("https://api.example.com/admin/").unwrap();
        HttpCollection::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_bearer_header_redacts() {
        let token = SecretString::from("super-secret");
        let header = BearerHeader::new(&token);
        assert_eq!(header.to_string(), "Bearer [REDACTED]");
        assert!(!format!("{header:?}").contains("super-secret"));

        let value = header.as_header_value().unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer super-secret");
    }

    #[test]
    fn test_urls() {
        let endpoint = endpoint();
        assert_eq!(
            endpoint.collection_url().unwrap().as_str(),
            "https://api.example.com/admin/places/"
        );
        assert_eq!(
            endpoint.item_url("abc").unwrap().as_str(),
            "https://api.example.com/admin/places/abc/"
        );
        assert_eq!(
            endpoint
                .transition_url("abc", &Transition::Approve)
                .unwrap()
                .as_str(),
            "https://api.example.com/admin/places/abc/approve/"
        );
    }

    #[test]
    fn test_item_url_encodes_id() {
        let url = endpoint().item_url("a/b c").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/admin/places/a%2Fb%20c/");
    }

    #[test]
    fn test_envelope_accepts_both_shapes() {
        let wrapped: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"data": {"id": "x"}}"#).unwrap();
        assert_eq!(wrapped.into_inner()["id"], "x");

        let bare: Envelope<serde_json::Value> = serde_json::from_str(r#"{"id": "y"}"#).unwrap();
        assert_eq!(bare.into_inner()["id"], "y");
    }
}
