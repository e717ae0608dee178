//! REST transport for the ManageIQ API.
//!
//! Requests are issued with `reqwest` on a private Tokio runtime so callers
//! stay synchronous (`block_on` per request). There are no retries; any
//! non-success status becomes a `CliError::RemoteOperation` carrying the
//! server's own error message.

use anyhow::{Context, anyhow, bail};
use reqwest::StatusCode;
use serde_json::{Value, json};
use url::Url;

use super::{Predicate, PredicateSet, Resource, Transport};
use crate::config::Settings;
use crate::error::{CliError, Result};

#[derive(Debug, Clone)]
enum Auth {
    Token(String),
    Basic { username: String, password: String },
}

pub struct RestClient {
    base: Url,
    auth: Auth,
    http: reqwest::Client,
    rt: tokio::runtime::Runtime,
}

impl RestClient {
    /// Build a client for the server in `settings`. Does not contact the server.
    pub fn connect(settings: &Settings) -> Result<Self> {
        let rt = tokio::runtime::Runtime::new()
            .context("Failed to create Tokio runtime")
            .map_err(CliError::remote)?;
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!settings.verify_ssl)
            .user_agent(concat!("miqcli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")
            .map_err(CliError::remote)?;
        let auth = match &settings.token {
            Some(token) => Auth::Token(token.clone()),
            None => Auth::Basic {
                username: settings.username.clone(),
                password: settings.password.clone(),
            },
        };
        crate::log_debug!("api endpoint: {}", settings.url);
        Ok(RestClient {
            base: settings.url.clone(),
            auth,
            http,
            rt,
        })
    }

    fn endpoint(&self, collection: &str, id: Option<&str>) -> anyhow::Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("base url cannot carry a path: {}", self.base))?;
            segments.pop_if_empty().push("api").push(collection);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Token(token) => req.header("X-Auth-Token", token),
            Auth::Basic { username, password } => req.basic_auth(username, Some(password)),
        }
    }

    /// GET returning `None` on 404.
    fn get_json(&self, url: Url, query: &[(String, String)]) -> anyhow::Result<Option<Value>> {
        crate::log_trace!("GET {url} {query:?}");
        let req = self.authorize(self.http.get(url.clone()).query(query));
        self.rt.block_on(async {
            let resp = req
                .send()
                .await
                .with_context(|| format!("GET {url} failed"))?;
            if resp.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            read_body(resp).await.map(Some)
        })
    }

    fn post_json(&self, url: Url, body: &Value) -> anyhow::Result<Value> {
        crate::log_trace!("POST {url} {body}");
        let req = self.authorize(self.http.post(url.clone()).json(body));
        self.rt.block_on(async {
            let resp = req
                .send()
                .await
                .with_context(|| format!("POST {url} failed"))?;
            read_body(resp).await
        })
    }

    fn query_collection(
        &self,
        collection: &str,
        filters: &[&Predicate],
        attributes: &[String],
    ) -> Result<Vec<Resource>> {
        let url = self.endpoint(collection, None).map_err(CliError::remote)?;
        let params = collection_params(filters, attributes);
        let body = self
            .get_json(url, &params)
            .map_err(CliError::remote)?
            .ok_or_else(|| CliError::not_found(format!("collection '{collection}' not found")))?;
        Ok(resources_of(body))
    }
}

async fn read_body(resp: reqwest::Response) -> anyhow::Result<Value> {
    let status = resp.status();
    let text = resp.text().await.context("failed to read response body")?;
    if !status.is_success() {
        bail!("{} ({status})", remote_error_message(&text));
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).context("response is not valid JSON")
}

/// Pull `error.message` out of an API error body, falling back to the raw text.
fn remote_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Query parameters for a collection listing.
pub fn collection_params(filters: &[&Predicate], attributes: &[String]) -> Vec<(String, String)> {
    let mut params = vec![("expand".to_string(), "resources".to_string())];
    if !attributes.is_empty() {
        params.push(("attributes".to_string(), attributes.join(",")));
    }
    for p in filters {
        params.push(("filter[]".to_string(), filter_expression(p)));
    }
    params
}

/// Render one predicate in the API's filter syntax. Non-numeric values are quoted.
pub fn filter_expression(p: &Predicate) -> String {
    let numeric = !p.value.is_empty() && p.value.chars().all(|c| c.is_ascii_digit());
    let value = if numeric {
        p.value.clone()
    } else {
        format!("'{}'", p.value.replace('\'', "\\'"))
    };
    format!("{}{}{}", p.field, p.op.as_str(), value)
}

fn resources_of(body: Value) -> Vec<Resource> {
    body.get("resources")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .cloned()
                .filter_map(Resource::from_value)
                .collect()
        })
        .unwrap_or_default()
}

fn id_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl Transport for RestClient {
    fn fetch_all(&self, collection: &str, attributes: &[String]) -> Result<Vec<Resource>> {
        self.query_collection(collection, &[], attributes)
    }

    fn fetch_by_predicate(
        &self,
        collection: &str,
        predicate: &Predicate,
        attributes: &[String],
    ) -> Result<Vec<Resource>> {
        self.query_collection(collection, &[predicate], attributes)
    }

    fn fetch_by_predicates(
        &self,
        collection: &str,
        predicates: &PredicateSet,
        attributes: &[String],
    ) -> Result<Vec<Resource>> {
        let filters: Vec<&Predicate> = predicates.iter().collect();
        self.query_collection(collection, &filters, attributes)
    }

    fn get(&self, collection: &str, id: &str, attributes: &[String]) -> Result<Option<Resource>> {
        let url = self
            .endpoint(collection, Some(id))
            .map_err(CliError::remote)?;
        let params: Vec<(String, String)> = if attributes.is_empty() {
            Vec::new()
        } else {
            vec![("attributes".to_string(), attributes.join(","))]
        };
        let body = self.get_json(url, &params).map_err(CliError::remote)?;
        Ok(body.and_then(Resource::from_value))
    }

    fn action(
        &self,
        collection: &str,
        id: &str,
        action: &str,
        payload: Option<Value>,
    ) -> Result<String> {
        let url = self
            .endpoint(collection, Some(id))
            .map_err(CliError::remote)?;
        let mut body = json!({ "action": action });
        if let Some(resource) = payload {
            body["resource"] = resource;
        }
        let resp = self.post_json(url, &body).map_err(CliError::remote)?;
        resp.get("task_id").and_then(id_text).ok_or_else(|| {
            let msg = resp
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("no task id in response");
            CliError::RemoteOperation(format!("{action} on {collection}/{id}: {msg}"))
        })
    }

    fn create(&self, collection: &str, payload: Value) -> Result<Vec<String>> {
        let url = self.endpoint(collection, None).map_err(CliError::remote)?;
        let body = json!({ "action": "create", "resource": payload });
        let resp = self.post_json(url, &body).map_err(CliError::remote)?;
        let ids: Vec<String> = resp
            .get("results")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|r| r.get("id").and_then(id_text)).collect())
            .unwrap_or_default();
        if ids.is_empty() {
            return Err(CliError::RemoteOperation(format!(
                "create on {collection} returned no results"
            )));
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileConfig, Overrides};

    fn client(url: &str) -> RestClient {
        let overrides = Overrides {
            url: Some(url.into()),
            ..Default::default()
        };
        let settings = Settings::resolve(FileConfig::default(), &overrides).unwrap();
        RestClient::connect(&settings).unwrap()
    }

    #[test]
    fn endpoint_joins_api_path() {
        let c = client("https://miq.example.com:8443");
        assert_eq!(
            c.endpoint("vms", None).unwrap().as_str(),
            "https://miq.example.com:8443/api/vms"
        );
        assert_eq!(
            c.endpoint("providers", Some("7")).unwrap().as_str(),
            "https://miq.example.com:8443/api/providers/7"
        );
    }

    #[test]
    fn endpoint_keeps_base_prefix() {
        let c = client("https://gw.example.com/manageiq/");
        assert_eq!(
            c.endpoint("vms", None).unwrap().as_str(),
            "https://gw.example.com/manageiq/api/vms"
        );
    }

    #[test]
    fn filter_quotes_text_but_not_numbers() {
        assert_eq!(filter_expression(&Predicate::eq("name", "vm1")), "name='vm1'");
        assert_eq!(filter_expression(&Predicate::eq("id", "42")), "id=42");
        assert_eq!(
            filter_expression(&Predicate::ne("request_state", "finished")),
            "request_state!='finished'"
        );
    }

    #[test]
    fn params_carry_one_filter_per_predicate() {
        let a = Predicate::eq("name", "vm1");
        let b = Predicate::eq("vendor", "openstack");
        let params = collection_params(&[&a, &b], &["ipaddresses".to_string()]);
        assert_eq!(params[0], ("expand".into(), "resources".into()));
        assert_eq!(params[1], ("attributes".into(), "ipaddresses".into()));
        let filters: Vec<&str> = params
            .iter()
            .filter(|(k, _)| k == "filter[]")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(filters, ["name='vm1'", "vendor='openstack'"]);
    }

    #[test]
    fn error_message_prefers_api_error_field() {
        let body = r#"{"error":{"kind":"bad_request","message":"Invalid filter"}}"#;
        assert_eq!(remote_error_message(body), "Invalid filter");
        assert_eq!(remote_error_message("gateway timeout\n"), "gateway timeout");
    }

    #[test]
    fn resources_are_extracted() {
        let body = json!({"resources":[{"id":"1","name":"a"}, 3, {"id":"2"}]});
        let rs = resources_of(body);
        assert_eq!(rs.len(), 2);
        assert_eq!(rs[1].id(), "2");
    }
}
