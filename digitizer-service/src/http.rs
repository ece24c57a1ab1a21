//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use digitizer_core::core::config::RemoteCfg;
use digitizer_core::core::error::SyncError;
use digitizer_core::core::Config;
use digitizer_core::datasource::{Request, Transport};
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Feature service reached by HTTP POST of JSON requests to `{url}/{action}`
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(url: &str, timeout: Duration) -> Result<HttpTransport, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        Ok(HttpTransport {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            timeout,
        })
    }
    pub fn endpoint(&self, action: &str) -> String {
        format!("{}/{}", self.base_url, action)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request) -> impl Future<Output = Result<Value, SyncError>> + Send {
        let client = self.client.clone();
        let url = self.endpoint(request.action());
        async move {
            let body = request.to_json()?;
            debug!("POST {}", url);
            let response = client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| SyncError::Transport(format!("{}: {}", url, e)))?;
            if !response.status().is_success() {
                return Err(SyncError::Transport(format!(
                    "{}: HTTP status {}",
                    url,
                    response.status()
                )));
            }
            response
                .json::<Value>()
                .await
                .map_err(|e| SyncError::MalformedResponse(e.to_string()))
        }
    }
}

impl<'a> Config<'a, RemoteCfg> for HttpTransport {
    fn from_config(cfg: &RemoteCfg) -> Result<Self, String> {
        let timeout = Duration::from_secs(cfg.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));
        HttpTransport::new(&cfg.url, timeout).map_err(|e| e.to_string())
    }
    fn gen_config() -> String {
        let toml = r#"
[remote]
# Feature service base URL
url = "http://127.0.0.1:8080/digitizer"
#timeout = 30
"#;
        toml.to_string()
    }
    fn gen_runtime_config(&self) -> String {
        format!(
            "\n[remote]\nurl = \"{}\"\ntimeout = {}\n",
            self.base_url,
            self.timeout.as_secs()
        )
    }
}

#[test]
fn test_endpoints() {
    let cfg = RemoteCfg {
        url: "http://localhost:8080/digitizer/".to_string(),
        timeout: Some(5),
    };
    let transport = HttpTransport::from_config(&cfg).unwrap();
    assert_eq!(transport.endpoint("select"), "http://localhost:8080/digitizer/select");
    assert_eq!(
        transport.gen_runtime_config(),
        "\n[remote]\nurl = \"http://localhost:8080/digitizer\"\ntimeout = 5\n"
    );
}
