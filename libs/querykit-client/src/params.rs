//! Call-level parameters and instance configuration.

use std::collections::HashMap;

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use querykit_odata::{IntoValue, ODataOptions, Value};

/// A bag of uninterpreted parameters forwarded alongside a request.
pub type ParamMap = Map<String, Json>;

/// Per-method passthrough overrides, keyed by uppercase method name.
pub type MethodParamMap = HashMap<String, ParamMap>;

/// Instance-level configuration, fixed at construction.
///
/// Deserializable so host applications can load it from their own
/// configuration layer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix prepended to every built URL.
    pub api_prefix: String,
    /// Parameters merged into every request's extra parameters.
    pub passthrough: ParamMap,
    /// Per-method overrides merged on top of `passthrough` for that method.
    pub passthrough_by_method: MethodParamMap,
    /// Opaque parameters forwarded verbatim to the transport.
    pub backend_params: ParamMap,
}

impl ClientConfig {
    /// Configuration with just an API prefix.
    #[must_use]
    pub fn new(api_prefix: impl Into<String>) -> Self {
        Self {
            api_prefix: api_prefix.into(),
            ..Self::default()
        }
    }

    /// Add a passthrough parameter applied to every request.
    #[must_use]
    pub fn with_passthrough(mut self, key: impl Into<String>, value: Json) -> Self {
        self.passthrough.insert(key.into(), value);
        self
    }

    /// Add a passthrough override for one method.
    #[must_use]
    pub fn with_method_passthrough(
        mut self,
        method: &Method,
        key: impl Into<String>,
        value: Json,
    ) -> Self {
        self.passthrough_by_method
            .entry(method.as_str().to_owned())
            .or_default()
            .insert(key.into(), value);
        self
    }

    /// Add an opaque backend parameter.
    #[must_use]
    pub fn with_backend_param(mut self, key: impl Into<String>, value: Json) -> Self {
        self.backend_params.insert(key.into(), value);
        self
    }
}

impl From<&str> for ClientConfig {
    fn from(api_prefix: &str) -> Self {
        Self::new(api_prefix)
    }
}

impl From<String> for ClientConfig {
    fn from(api_prefix: String) -> Self {
        Self::new(api_prefix)
    }
}

/// Call-level request parameters.
///
/// `url` and `resource` are the two addressing entry points; when both are
/// present `url` wins and `resource`/`id` are ignored.
#[derive(Clone, Debug, Default)]
pub struct Params {
    /// Per-call API prefix override.
    pub api_prefix: Option<String>,
    /// Explicit method; each verb helper fixes its own default instead.
    pub method: Option<Method>,
    /// Resource name used to build the path.
    pub resource: Option<String>,
    /// Resource id, rendered into the path as `resource(<id>)`.
    pub id: Option<Value>,
    /// Verbatim path, used instead of `resource`.
    pub url: Option<String>,
    /// Request body forwarded to the transport.
    pub body: Option<Json>,
    /// Call-level passthrough parameters (win over instance-level ones).
    pub passthrough: ParamMap,
    /// Call-level per-method passthrough overrides.
    pub passthrough_by_method: MethodParamMap,
    /// Additional uninterpreted parameters; highest merge precedence.
    pub custom_options: ParamMap,
    /// Query options compiled into the URL's query string.
    pub options: Option<ODataOptions>,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Address a resource collection by name.
    #[must_use]
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Address a single resource instance.
    #[must_use]
    pub fn id(mut self, id: impl IntoValue) -> Self {
        self.id = Some(id.into_value());
        self
    }

    /// Use a verbatim path instead of `resource`.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Override the API prefix for this call.
    #[must_use]
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    /// Set an explicit method, honored by `request`.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Attach a request body.
    #[must_use]
    pub fn body(mut self, body: Json) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach compiled query options.
    #[must_use]
    pub fn options(mut self, options: ODataOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Add a call-level passthrough parameter.
    #[must_use]
    pub fn passthrough(mut self, key: impl Into<String>, value: Json) -> Self {
        self.passthrough.insert(key.into(), value);
        self
    }

    /// Add a call-level custom option (highest merge precedence).
    #[must_use]
    pub fn custom_option(mut self, key: impl Into<String>, value: Json) -> Self {
        self.custom_options.insert(key.into(), value);
        self
    }
}
