//! Remote collection fetcher.

use std::sync::Arc;

use secrecy::SecretString;

use crate::auth::CredentialProvider;
use crate::error::{DeskError, Result};
use crate::remote::{CollectionEndpoint, ListQuery, Page};
use crate::resources::Resource;

/// Endpoint plus credentials for one resource.
///
/// Performs one endpoint call per `fetch` and never touches controller state.
pub struct Fetcher<R: Resource> {
    endpoint: Arc<dyn CollectionEndpoint<R>>,
    credentials: Arc<dyn CredentialProvider>,
}

impl<R: Resource> Fetcher<R> {
    pub fn new(
        endpoint: Arc<dyn CollectionEndpoint<R>>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            endpoint,
            credentials,
        }
    }

    /// The current access token, or `Unauthenticated`
    pub fn token(&self) -> Result<SecretString> {
        self.credentials
            .access_token()
            .ok_or(DeskError::Unauthenticated)
    }

    pub fn endpoint(&self) -> &dyn CollectionEndpoint<R> {
        self.endpoint.as_ref()
    }

    pub async fn fetch(&self, query: &ListQuery) -> Result<Page<R::Item>> {
        let token = self.token()?;
        tracing::debug!(
            resource = R::NAME,
            page = query.page,
            search = query.search.as_deref().unwrap_or(""),
            ordering = %query.ordering,
            "fetching collection page"
        );
        self.endpoint.list(&token, query).await
    }
}
