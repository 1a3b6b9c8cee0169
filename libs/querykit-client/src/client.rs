//! The public client surface.

use http::Method;
use serde_json::Value as Json;

use crate::errors::Error;
use crate::params::{ClientConfig, ParamMap, Params};
use crate::resolver::resolve;
use crate::transport::Transport;

/// Transport-agnostic OData client.
///
/// A `Client` pairs immutable instance configuration with an injected
/// [`Transport`]. Configuration is read-only after construction, so `&self`
/// verbs may run concurrently with no ordering guarantees between them;
/// two `compile` calls with identical input always yield identical output.
///
/// # Example
///
/// ```ignore
/// use querykit_client::{Client, ClientConfig, Params};
/// use querykit_odata::{field, ODataOptions};
///
/// let client = Client::new(ClientConfig::new("/v1"), transport);
/// let devices = client
///     .get(
///         Params::new()
///             .resource("device")
///             .options(ODataOptions::new().with_filter(field("active").eq(true))),
///     )
///     .await?;
/// ```
pub struct Client<T> {
    config: ClientConfig,
    transport: T,
}

impl<T> Client<T> {
    /// Create a client from instance configuration and a transport.
    pub fn new(config: impl Into<ClientConfig>, transport: T) -> Self {
        Self {
            config: config.into(),
            transport,
        }
    }

    /// The instance configuration (read-only).
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve the full URL for `params` without performing a network
    /// call. Useful for debugging and testing.
    ///
    /// # Errors
    /// Propagates resolver and query-compilation errors.
    pub fn compile(&self, params: &Params) -> Result<String, Error> {
        let method = params.method.clone().unwrap_or(Method::GET);
        Ok(resolve(&self.config, params, method)?.url)
    }

    /// Derive a new client inheriting this instance's configuration.
    ///
    /// `overrides` replaces the API prefix and the passthrough maps when
    /// supplied (an empty map means "inherit"); `backend_params` replaces
    /// the backend parameter bag when given. The derived client owns its
    /// configuration exclusively; nothing is shared with the original.
    #[must_use]
    pub fn clone_with(&self, overrides: &Params, backend_params: Option<ParamMap>) -> Self
    where
        T: Clone,
    {
        let mut config = self.config.clone();
        if let Some(prefix) = &overrides.api_prefix {
            config.api_prefix = prefix.clone();
        }
        if !overrides.passthrough.is_empty() {
            config.passthrough = overrides.passthrough.clone();
        }
        if !overrides.passthrough_by_method.is_empty() {
            config.passthrough_by_method = overrides.passthrough_by_method.clone();
        }
        if let Some(backend) = backend_params {
            config.backend_params = backend;
        }
        Self {
            config,
            transport: self.transport.clone(),
        }
    }
}

impl<T: Transport> Client<T> {
    /// Resolve and dispatch a request.
    ///
    /// The effective method is `method_override` when given, else
    /// `params.method`, else `GET`. All compilation and resolution errors
    /// surface before the transport is invoked; the transport outcome is
    /// relayed unchanged.
    ///
    /// # Errors
    /// Returns resolver/compiler errors synchronously and transport
    /// failures as [`Error::Transport`].
    pub async fn request(
        &self,
        params: Params,
        method_override: Option<Method>,
    ) -> Result<Json, Error> {
        let method = method_override
            .or_else(|| params.method.clone())
            .unwrap_or(Method::GET);
        let request = resolve(&self.config, &params, method)?;
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");
        self.transport.send(request).await.map_err(|err| {
            tracing::debug!(error = %err, "transport reported failure");
            Error::Transport(err)
        })
    }

    /// Fetch a resource or collection (`GET`).
    pub async fn get(&self, params: Params) -> Result<Json, Error> {
        self.request(params, Some(Method::GET)).await
    }

    /// Alias of [`Client::get`], kept for callers reading result sets.
    pub async fn query(&self, params: Params) -> Result<Json, Error> {
        self.request(params, Some(Method::GET)).await
    }

    /// Replace a resource (`PUT`).
    pub async fn put(&self, params: Params) -> Result<Json, Error> {
        self.request(params, Some(Method::PUT)).await
    }

    /// Update fields of a resource (`PATCH`).
    pub async fn patch(&self, params: Params) -> Result<Json, Error> {
        self.request(params, Some(Method::PATCH)).await
    }

    /// Create a resource (`POST`).
    pub async fn post(&self, params: Params) -> Result<Json, Error> {
        self.request(params, Some(Method::POST)).await
    }

    /// Delete a resource (`DELETE`).
    pub async fn delete(&self, params: Params) -> Result<Json, Error> {
        self.request(params, Some(Method::DELETE)).await
    }
}
