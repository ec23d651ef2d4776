// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: an in-memory stand-in for the Kubernetes API server.

use http::{Method, Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct State {
    /// Objects keyed by their item path, e.g. `/api/v1/namespaces/shop/services/orders`
    objects: BTreeMap<String, Value>,
    failures: HashMap<(Method, String), u16>,
    /// Item paths another writer updates right after the next read
    concurrent_writes: HashSet<String>,
    requests: Vec<RecordedRequest>,
    next_version: u64,
}

impl State {
    fn bump_version(&mut self) -> String {
        self.next_version += 1;
        self.next_version.to_string()
    }
}

/// A mock HTTP service that keeps objects in memory and answers
/// get, list, create, replace and delete calls against them.
///
/// Replaces are rejected with 409 unless they carry the stored resourceVersion.
#[derive(Clone, Default)]
pub struct MockApiServer {
    state: Arc<Mutex<State>>,
}

impl MockApiServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object. `collection` is the list path, e.g. `/api/v1/namespaces/shop/services`.
    pub fn with_object(self, collection: &str, mut object: Value) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let version = state.bump_version();
            object["metadata"]["resourceVersion"] = json!(version);
            let name = object["metadata"]["name"].as_str().unwrap().to_string();
            state.objects.insert(format!("{}/{}", collection, name), object);
        }
        self
    }

    /// Answer every `method` request on exactly `path` with an error status
    pub fn fail_on(self, method: Method, path: &str, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((method, path.to_string()), status);
        self
    }

    /// Simulate another writer: the first GET of `path` is answered, then the
    /// stored object's resourceVersion moves on before the caller can write back
    pub fn with_concurrent_write(self, path: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .concurrent_writes
            .insert(path.to_string());
        self
    }

    /// Build a kube Client from this mock service
    pub fn client(&self) -> Client {
        Client::new(self.clone(), "default")
    }

    pub fn object(&self, path: &str) -> Option<Value> {
        self.state.lock().unwrap().objects.get(path).cloned()
    }

    /// Names of the objects directly under a collection path, sorted
    pub fn names_in(&self, collection: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        children(&state.objects, collection)
            .map(|(path, _)| path.rsplit('/').next().unwrap_or_default().to_string())
            .collect()
    }

    /// All stored item paths, sorted
    pub fn paths(&self) -> Vec<String> {
        self.state.lock().unwrap().objects.keys().cloned().collect()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests that changed state (everything except GET)
    pub fn writes(&self) -> Vec<(Method, String)> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != Method::GET)
            .map(|r| (r.method, r.path))
            .collect()
    }

    fn handle(&self, request: RecordedRequest) -> (u16, Value) {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        if let Some(status) = state
            .failures
            .get(&(request.method.clone(), request.path.clone()))
        {
            return (*status, status_json(*status, "injected failure"));
        }

        let path = request.path.trim_end_matches('/').to_string();
        let is_collection = is_collection_path(&path);

        match (request.method, is_collection) {
            (Method::GET, true) => {
                let items: Vec<Value> = children(&state.objects, &path)
                    .map(|(_, object)| object.clone())
                    .collect();
                let list = json!({
                    "apiVersion": "v1",
                    "kind": "List",
                    "metadata": { "resourceVersion": state.next_version.to_string() },
                    "items": items,
                });
                (200, list)
            }
            (Method::GET, false) => {
                let Some(object) = state.objects.get(&path).cloned() else {
                    return (404, status_json(404, &format!("{} not found", path)));
                };
                if state.concurrent_writes.remove(&path) {
                    let version = state.bump_version();
                    if let Some(stored) = state.objects.get_mut(&path) {
                        stored["metadata"]["resourceVersion"] = json!(version);
                    }
                }
                (200, object)
            }
            (Method::POST, true) => {
                let Some(mut object) = request.body else {
                    return (400, status_json(400, "missing body"));
                };
                let Some(name) = object["metadata"]["name"].as_str().map(str::to_string) else {
                    return (422, status_json(422, "metadata.name is required"));
                };
                let item_path = format!("{}/{}", path, name);
                if state.objects.contains_key(&item_path) {
                    return (409, status_json(409, &format!("{} already exists", name)));
                }
                object["metadata"]["resourceVersion"] = json!(state.bump_version());
                state.objects.insert(item_path, object.clone());
                (201, object)
            }
            (Method::PUT, false) => {
                let Some(mut object) = request.body else {
                    return (400, status_json(400, "missing body"));
                };
                let Some(stored) = state.objects.get(&path) else {
                    return (404, status_json(404, &format!("{} not found", path)));
                };
                if object["metadata"]["resourceVersion"] != stored["metadata"]["resourceVersion"] {
                    return (
                        409,
                        status_json(409, "the object has been modified; please apply your changes to the latest version"),
                    );
                }
                object["metadata"]["resourceVersion"] = json!(state.bump_version());
                state.objects.insert(path, object.clone());
                (200, object)
            }
            (Method::DELETE, false) => match state.objects.remove(&path) {
                Some(object) => (200, object),
                None => (404, status_json(404, &format!("{} not found", path))),
            },
            _ => (405, status_json(405, "method not allowed")),
        }
    }
}

/// Objects exactly one path segment below `collection`
fn children<'a>(
    objects: &'a BTreeMap<String, Value>,
    collection: &'a str,
) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
    let prefix = format!("{}/", collection);
    objects
        .iter()
        .filter(move |(path, _)| {
            path.strip_prefix(&prefix)
                .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
        })
}

/// `/api/v1/...` and `/apis/<group>/<version>/...` paths alternate between
/// collection and item segments after their prefix
fn is_collection_path(path: &str) -> bool {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let prefix_len = if segments.first() == Some(&"apis") { 3 } else { 2 };
    segments.len().saturating_sub(prefix_len) % 2 == 1
}

fn status_json(code: u16, message: &str) -> Value {
    let reason = match code {
        404 => "NotFound",
        409 => "Conflict",
        422 => "Invalid",
        _ => "InternalError",
    };
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
}

impl Service<Request<Body>> for MockApiServer {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let server = self.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let bytes = body.collect().await?.to_bytes();
            let body = if bytes.is_empty() {
                None
            } else {
                serde_json::from_slice(&bytes).ok()
            };

            let (status, response) = server.handle(RecordedRequest {
                method: parts.method,
                path: parts.uri.path().to_string(),
                query: parts.uri.query().map(str::to_string),
                body,
            });

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(response.to_string().into_bytes()))
                .unwrap())
        })
    }
}

/// Collection paths for the resource kinds the reconciler manages
pub mod paths {
    pub const NAMESPACES: &str = "/api/v1/namespaces";

    pub fn services(namespace: &str) -> String {
        format!("/api/v1/namespaces/{}/services", namespace)
    }

    pub fn deployments(namespace: &str) -> String {
        format!("/apis/apps/v1/namespaces/{}/deployments", namespace)
    }

    pub fn virtual_services(namespace: &str) -> String {
        format!("/apis/networking.istio.io/v1/namespaces/{}/virtualservices", namespace)
    }

    pub fn destination_rules(namespace: &str) -> String {
        format!("/apis/networking.istio.io/v1/namespaces/{}/destinationrules", namespace)
    }

    pub fn gateways(namespace: &str) -> String {
        format!("/apis/networking.istio.io/v1/namespaces/{}/gateways", namespace)
    }
}

/// Create a namespace JSON object with the given labels
pub fn namespace_json(name: &str, labels: &[(&str, &str)]) -> Value {
    let labels: BTreeMap<&str, &str> = labels.iter().copied().collect();
    json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "labels": labels,
        }
    })
}

pub fn service_json(namespace: &str, name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": { "name": name, "namespace": namespace },
        "spec": { "ports": [{ "port": 8080 }] }
    })
}

pub fn deployment_json(namespace: &str, name: &str) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": { "name": name, "namespace": namespace },
        "spec": {
            "selector": { "matchLabels": { "app": name } },
            "template": { "metadata": { "labels": { "app": name } } }
        }
    })
}

pub fn virtual_service_json(namespace: &str, name: &str, rules: &[&str]) -> Value {
    let http: Vec<Value> = rules
        .iter()
        .map(|rule| json!({ "name": rule, "route": [{ "destination": { "host": name } }] }))
        .collect();
    json!({
        "apiVersion": "networking.istio.io/v1",
        "kind": "VirtualService",
        "metadata": { "name": name, "namespace": namespace },
        "spec": { "hosts": [name], "http": http }
    })
}

pub fn destination_rule_json(namespace: &str, name: &str, subsets: &[&str]) -> Value {
    let subsets: Vec<Value> = subsets
        .iter()
        .map(|subset| json!({ "name": subset, "labels": { "version": subset } }))
        .collect();
    json!({
        "apiVersion": "networking.istio.io/v1",
        "kind": "DestinationRule",
        "metadata": { "name": name, "namespace": namespace },
        "spec": { "host": name, "subsets": subsets }
    })
}

pub fn gateway_json(namespace: &str, name: &str) -> Value {
    json!({
        "apiVersion": "networking.istio.io/v1",
        "kind": "Gateway",
        "metadata": { "name": name, "namespace": namespace },
        "spec": { "selector": { "istio": "ingressgateway" } }
    })
}
