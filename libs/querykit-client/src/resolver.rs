//! Request-parameter resolution.
//!
//! Collapses instance configuration, call parameters, and per-method
//! overrides into one outbound request descriptor. Resolution is pure and
//! synchronous; a request that fails to resolve is never dispatched.

use http::Method;
use serde_json::Value as Json;

use crate::errors::Error;
use crate::params::{ClientConfig, ParamMap, Params};

/// The fully resolved request handed to the transport.
#[derive(Clone, Debug)]
pub struct ResolvedRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Json>,
    /// Merged passthrough and custom options; uninterpreted by the client.
    pub extra_params: ParamMap,
    /// Instance backend parameters, forwarded verbatim.
    pub backend_params: ParamMap,
}

/// Resolve `params` against `config` for the given effective method.
///
/// # Errors
/// Returns `Error::MissingAddress` when neither `resource` nor `url` is
/// supplied, and propagates query-compilation errors from the options.
pub fn resolve(
    config: &ClientConfig,
    params: &Params,
    method: Method,
) -> Result<ResolvedRequest, Error> {
    let api_prefix = params.api_prefix.as_deref().unwrap_or(&config.api_prefix);

    let mut url = if let Some(path) = &params.url {
        format!("{api_prefix}{path}")
    } else if let Some(resource) = &params.resource {
        match &params.id {
            Some(id) => format!("{api_prefix}/{resource}({})", id.to_odata_literal()),
            None => format!("{api_prefix}/{resource}"),
        }
    } else {
        return Err(Error::MissingAddress);
    };

    if let Some(options) = &params.options {
        let query = options.to_query_string()?;
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
    }

    // Merge order, rightmost wins: instance passthrough, instance
    // per-method, call passthrough, call per-method, custom options.
    let mut extra_params = config.passthrough.clone();
    if let Some(overrides) = config.passthrough_by_method.get(method.as_str()) {
        merge(&mut extra_params, overrides);
    }
    merge(&mut extra_params, &params.passthrough);
    if let Some(overrides) = params.passthrough_by_method.get(method.as_str()) {
        merge(&mut extra_params, overrides);
    }
    merge(&mut extra_params, &params.custom_options);

    Ok(ResolvedRequest {
        method,
        url,
        body: params.body.clone(),
        extra_params,
        backend_params: config.backend_params.clone(),
    })
}

fn merge(target: &mut ParamMap, overrides: &ParamMap) {
    for (key, value) in overrides {
        target.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querykit_odata::{ODataOptions, Value, field};
    use serde_json::json;

    #[test]
    fn test_resource_url() {
        let config = ClientConfig::new("/v1");
        let params = Params::new().resource("device");
        let resolved = resolve(&config, &params, Method::GET).unwrap();
        assert_eq!(resolved.url, "/v1/device");
    }

    #[test]
    fn test_numeric_and_string_ids() {
        let config = ClientConfig::new("/v1");

        let resolved =
            resolve(&config, &Params::new().resource("device").id(5), Method::GET).unwrap();
        assert_eq!(resolved.url, "/v1/device(5)");

        let resolved = resolve(
            &config,
            &Params::new().resource("device").id("a-b"),
            Method::GET,
        )
        .unwrap();
        assert_eq!(resolved.url, "/v1/device('a-b')");
    }

    #[test]
    fn test_verbatim_url_wins_over_resource() {
        let config = ClientConfig::new("/v1");
        let params = Params::new()
            .resource("device")
            .url("/device(5)/custom");
        let resolved = resolve(&config, &params, Method::GET).unwrap();
        assert_eq!(resolved.url, "/v1/device(5)/custom");
    }

    #[test]
    fn test_query_string_appended() {
        let config = ClientConfig::new("/v1");
        let params = Params::new()
            .resource("device")
            .options(ODataOptions::new().with_filter(field("active").eq(true)));
        let resolved = resolve(&config, &params, Method::GET).unwrap();
        assert_eq!(resolved.url, "/v1/device?$filter=active eq true");
    }

    #[test]
    fn test_empty_options_append_nothing() {
        let config = ClientConfig::new("/v1");
        let params = Params::new().resource("device").options(ODataOptions::new());
        let resolved = resolve(&config, &params, Method::GET).unwrap();
        assert_eq!(resolved.url, "/v1/device");
    }

    #[test]
    fn test_call_prefix_overrides_instance_prefix() {
        let config = ClientConfig::new("/v1");
        let params = Params::new().resource("device").api_prefix("/v2");
        let resolved = resolve(&config, &params, Method::GET).unwrap();
        assert_eq!(resolved.url, "/v2/device");
    }

    #[test]
    fn test_missing_address() {
        let config = ClientConfig::new("/v1");
        assert!(matches!(
            resolve(&config, &Params::new(), Method::GET),
            Err(Error::MissingAddress)
        ));
    }

    #[test]
    fn test_merge_precedence() {
        let config = ClientConfig::new("/v1")
            .with_passthrough("a", json!(1))
            .with_passthrough("b", json!(1))
            .with_passthrough("c", json!(1))
            .with_method_passthrough(&Method::DELETE, "b", json!(2))
            .with_method_passthrough(&Method::DELETE, "c", json!(2));
        let params = Params::new().resource("device").passthrough("c", json!(3));

        let resolved = resolve(&config, &params, Method::DELETE).unwrap();
        assert_eq!(resolved.extra_params["a"], json!(1));
        assert_eq!(resolved.extra_params["b"], json!(2));
        assert_eq!(resolved.extra_params["c"], json!(3));
    }

    #[test]
    fn test_method_overrides_apply_to_their_method_only() {
        let config = ClientConfig::new("/v1")
            .with_method_passthrough(&Method::DELETE, "confirm", json!(true));
        let params = Params::new().resource("device");

        let resolved = resolve(&config, &params, Method::GET).unwrap();
        assert!(!resolved.extra_params.contains_key("confirm"));
    }

    #[test]
    fn test_custom_options_win_over_everything() {
        let config = ClientConfig::new("/v1").with_passthrough("k", json!("instance"));
        let params = Params::new()
            .resource("device")
            .passthrough("k", json!("call"))
            .custom_option("k", json!("custom"));

        let resolved = resolve(&config, &params, Method::GET).unwrap();
        assert_eq!(resolved.extra_params["k"], json!("custom"));
    }

    #[test]
    fn test_backend_params_forwarded_verbatim() {
        let config = ClientConfig::new("/v1").with_backend_param("region", json!("eu"));
        let params = Params::new().resource("device");
        let resolved = resolve(&config, &params, Method::GET).unwrap();
        assert_eq!(resolved.backend_params["region"], json!("eu"));
    }

    #[test]
    fn test_malformed_options_fail_resolution() {
        let config = ClientConfig::new("/v1");
        let mut options = ODataOptions::new();
        options.filter = Some(querykit_odata::Filter::AllOf(vec![]));
        let params = Params::new().resource("device").options(options);
        assert!(matches!(
            resolve(&config, &params, Method::GET),
            Err(Error::Query(_))
        ));
    }

    #[test]
    fn test_date_id_rendered_as_datetime_literal() {
        let config = ClientConfig::new("/v1");
        let date = chrono_date();
        let params = Params::new().resource("log").id(date);
        let resolved = resolve(&config, &params, Method::GET).unwrap();
        assert_eq!(resolved.url, "/v1/log(datetime'2024-01-02')");
    }

    fn chrono_date() -> Value {
        use querykit_odata::IntoValue;
        chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .into_value()
    }
}
