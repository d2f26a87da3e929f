use oval_utils::log::debug;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT},
    Method, RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::{
    config::TenderlyConfig,
    env::Environment,
    error::{Result, TenderlyError},
};

pub static ACCESS_KEY_HEADER: &str = "X-Access-Key";

/// Thin HTTP layer over the Tenderly REST API of one account/project.
///
/// Every call is a single attempt: a non-2xx status is returned as
/// [`TenderlyError::Transport`] and never retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    env: Environment,
    cfg: TenderlyConfig,
}

impl ApiClient {
    pub fn new(env: Environment, cfg: TenderlyConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.append(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.append(
            USER_AGENT,
            HeaderValue::from_static(concat!("oval-tenderly/", env!("CARGO_PKG_VERSION"))),
        );
        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = cfg.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { http, env, cfg })
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn config(&self) -> &TenderlyConfig {
        &self.cfg
    }

    /// `{api}/account/{user}/project/{project}/{path}`
    pub fn project_url(&self, path: &str) -> String {
        format!(
            "{}/account/{}/project/{}/{}",
            self.cfg.api_url, self.env.user, self.env.project, path
        )
    }

    /// `{api}/public/account/{user}/project/{project}`
    pub fn public_project_url(&self) -> String {
        format!(
            "{}/public/account/{}/project/{}",
            self.cfg.api_url, self.env.user, self.env.project
        )
    }

    pub fn dashboard_url(&self, path: &str) -> String {
        format!("{}/{}", self.cfg.dashboard_url, path)
    }

    pub(crate) async fn get(&self, url: &str) -> Result<String> {
        Self::execute(self.request(Method::GET, url)).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        Self::execute(self.request(Method::POST, url).json(body)).await
    }

    pub(crate) async fn put<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        Self::execute(self.request(Method::PUT, url).json(body)).await
    }

    pub(crate) async fn delete(&self, url: &str) -> Result<String> {
        Self::execute(self.request(Method::DELETE, url)).await
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(method = %method.as_str(), url, "tenderly request");
        self.http
            .request(method, url)
            .header(ACCESS_KEY_HEADER, &self.env.api_key)
    }

    async fn execute(request: RequestBuilder) -> Result<String> {
        let text = request
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }

    /// Sends one JSON-RPC 2.0 call to `url`, outside the REST API.
    /// A JSON-RPC error object is reported as a transport failure.
    pub(crate) async fn rpc_call(&self, url: &str, method: &str, params: Value) -> Result<Value> {
        debug!(url, method, "json-rpc request");
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let text = Self::execute(self.http.post(url).json(&request)).await?;
        let response: RpcResponse = parse_body("json-rpc", &text)?;
        match response.error {
            Some(error) => Err(TenderlyError::Transport {
                status: None,
                message: format!("{} failed: {} (code {})", method, error.message, error.code),
            }),
            None => Ok(response.result.unwrap_or(Value::Null)),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, serde::Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Checks a response body against the shape `T`.
/// This is the single place where [`TenderlyError::MalformedResponse`] is built.
pub fn parse_body<T: DeserializeOwned>(what: &'static str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        debug!(what, error = %e, "unexpected response shape");
        TenderlyError::MalformedResponse {
            what,
            body: body.to_string(),
        }
    })
}
