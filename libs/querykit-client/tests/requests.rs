//! End-to-end client checks against a recording in-process transport.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value as Json, json};

use querykit_client::{
    BoxError, Client, ClientConfig, Error, Method, Params, ResolvedRequest, Transport,
};
use querykit_odata::{Filter, ODataOptions, field};

/// Transport that records every descriptor it receives and returns a
/// canned response (or a canned failure).
#[derive(Clone)]
struct RecordingTransport {
    requests: Arc<Mutex<Vec<ResolvedRequest>>>,
    response: Json,
    fail_with: Option<&'static str>,
}

impl RecordingTransport {
    fn new(response: Json) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            response,
            fail_with: None,
        }
    }

    fn failing(message: &'static str) -> Self {
        Self {
            fail_with: Some(message),
            ..Self::new(Json::Null)
        }
    }

    fn seen(&self) -> Vec<ResolvedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ResolvedRequest) -> Result<Json, BoxError> {
        self.requests.lock().unwrap().push(request);
        match self.fail_with {
            Some(message) => Err(message.into()),
            None => Ok(self.response.clone()),
        }
    }
}

fn client_with(response: Json) -> (Client<RecordingTransport>, RecordingTransport) {
    let transport = RecordingTransport::new(response);
    (
        Client::new(ClientConfig::new("/v1"), transport.clone()),
        transport,
    )
}

#[tokio::test]
async fn get_dispatches_resolved_descriptor() {
    let (client, transport) = client_with(json!([{"id": 1}]));

    let result = client
        .get(
            Params::new()
                .resource("device")
                .options(ODataOptions::new().with_filter(field("active").eq(true))),
        )
        .await
        .unwrap();

    assert_eq!(result, json!([{"id": 1}]));
    let seen = transport.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::GET);
    assert_eq!(seen[0].url, "/v1/device?$filter=active eq true");
    assert!(seen[0].body.is_none());
}

#[tokio::test]
async fn post_forwards_body() {
    let (client, transport) = client_with(json!({"id": 2}));

    client
        .post(
            Params::new()
                .resource("device")
                .body(json!({"name": "probe"})),
        )
        .await
        .unwrap();

    let seen = transport.seen();
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[0].body, Some(json!({"name": "probe"})));
}

#[tokio::test]
async fn verb_helpers_fix_their_method() {
    let (client, transport) = client_with(Json::Null);

    // get() wins even when params carry another method.
    client
        .get(Params::new().resource("device").method(Method::POST))
        .await
        .unwrap();

    assert_eq!(transport.seen()[0].method, Method::GET);
}

#[tokio::test]
async fn request_honors_params_method_and_override() {
    let (client, transport) = client_with(Json::Null);

    client
        .request(Params::new().resource("device").method(Method::PATCH), None)
        .await
        .unwrap();
    client
        .request(
            Params::new().resource("device").method(Method::PATCH),
            Some(Method::DELETE),
        )
        .await
        .unwrap();
    client.request(Params::new().resource("device"), None).await.unwrap();

    let methods: Vec<Method> = transport.seen().into_iter().map(|r| r.method).collect();
    assert_eq!(methods, vec![Method::PATCH, Method::DELETE, Method::GET]);
}

#[tokio::test]
async fn compile_matches_dispatched_url() {
    let (client, transport) = client_with(Json::Null);
    let params = Params::new()
        .resource("device")
        .id(5)
        .options(ODataOptions::new().with_select(["id", "name"]));

    let compiled = client.compile(&params).unwrap();
    client.get(params).await.unwrap();

    assert_eq!(compiled, "/v1/device(5)?$select=id,name");
    assert_eq!(transport.seen()[0].url, compiled);
}

#[tokio::test]
async fn clone_inherits_configuration() {
    let transport = RecordingTransport::new(Json::Null);
    let client = Client::new(
        ClientConfig::new("/v1").with_passthrough("apikey", json!("secret")),
        transport,
    );

    let cloned = client.clone_with(&Params::new(), None);
    let params = Params::new().resource("device");
    assert_eq!(
        cloned.compile(&params).unwrap(),
        client.compile(&params).unwrap()
    );
    assert_eq!(cloned.config().passthrough["apikey"], json!("secret"));
}

#[tokio::test]
async fn clone_overrides_replace_inherited_values() {
    let transport = RecordingTransport::new(Json::Null);
    let client = Client::new(ClientConfig::new("/v1"), transport.clone());

    let cloned = client.clone_with(&Params::new().api_prefix("/v2"), None);
    cloned.get(Params::new().resource("device")).await.unwrap();

    assert_eq!(transport.seen()[0].url, "/v2/device");
    // The original keeps its own configuration.
    assert_eq!(
        client.compile(&Params::new().resource("device")).unwrap(),
        "/v1/device"
    );
}

#[tokio::test]
async fn malformed_filter_fails_before_any_transport_call() {
    let (client, transport) = client_with(Json::Null);

    let mut options = ODataOptions::new();
    options.filter = Some(Filter::AllOf(vec![]));
    let outcome = client
        .get(Params::new().resource("device").options(options))
        .await;

    assert!(matches!(outcome, Err(Error::Query(_))));
    assert!(transport.seen().is_empty());
}

#[tokio::test]
async fn missing_address_is_rejected() {
    let (client, transport) = client_with(Json::Null);

    let outcome = client.get(Params::new()).await;

    assert!(matches!(outcome, Err(Error::MissingAddress)));
    assert!(transport.seen().is_empty());
}

#[tokio::test]
async fn transport_failure_passes_through_opaquely() {
    let transport = RecordingTransport::failing("connection reset");
    let client = Client::new(ClientConfig::new("/v1"), transport);

    let outcome = client.get(Params::new().resource("device")).await;

    match outcome {
        Err(Error::Transport(source)) => {
            assert_eq!(source.to_string(), "connection reset");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_sees_merged_extra_and_backend_params() {
    let transport = RecordingTransport::new(Json::Null);
    let client = Client::new(
        ClientConfig::new("/v1")
            .with_passthrough("apikey", json!("secret"))
            .with_method_passthrough(&Method::DELETE, "confirm", json!(true))
            .with_backend_param("region", json!("eu")),
        transport.clone(),
    );

    client
        .delete(
            Params::new()
                .resource("device")
                .id(5)
                .custom_option("dry_run", json!(true)),
        )
        .await
        .unwrap();

    let seen = transport.seen();
    assert_eq!(seen[0].extra_params["apikey"], json!("secret"));
    assert_eq!(seen[0].extra_params["confirm"], json!(true));
    assert_eq!(seen[0].extra_params["dry_run"], json!(true));
    assert_eq!(seen[0].backend_params["region"], json!("eu"));
}

#[tokio::test]
async fn concurrent_calls_share_no_state() {
    let (client, transport) = client_with(Json::Null);

    let first = client.get(Params::new().resource("device"));
    let second = client.get(Params::new().resource("application"));
    let (a, b) = futures::join!(first, second);
    a.unwrap();
    b.unwrap();

    let mut urls: Vec<String> = transport.seen().into_iter().map(|r| r.url).collect();
    urls.sort();
    assert_eq!(urls, vec!["/v1/application", "/v1/device"]);
}
