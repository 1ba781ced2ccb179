use std::future::Future;
use std::sync::RwLock;
use std::time::Duration;

use chrono::Utc;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::client::error::ClientError;
use crate::propagate::{PositionReport, PositionSample};
use crate::web::api::error::ErrorResponse;

/// Upper bound on one request, so a silent server ends the session
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Remote end of a tracking session.
pub trait PositionClient: Send + Sync + 'static {
    fn list_satellites(&self) -> impl Future<Output = Result<Vec<String>, ClientError>> + Send;

    fn get_position(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<PositionSample, ClientError>> + Send;
}

/// Join path segments onto `base`, percent-encoding each one
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ClientError> {
    let invalid = |message: String| ClientError::InvalidBaseUrl {
        url: base.to_string(),
        message,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// JSON client for the position API. The base URL can be swapped while a
/// session is running; the next request picks it up.
pub struct HttpPositionClient {
    http: reqwest::Client,
    base_url: RwLock<String>,
}

impl HttpPositionClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        // fail early on unusable addresses
        endpoint(base_url, &[])?;
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: RwLock::new(base_url.to_string()),
        })
    }

    pub fn base_url(&self) -> String {
        self.base_url
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_base_url(&self, base_url: &str) -> Result<(), ClientError> {
        endpoint(base_url, &[])?;
        *self
            .base_url
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = base_url.to_string();
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = endpoint(&self.base_url(), segments)?;
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("unknown").to_string(),
        };
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

impl PositionClient for HttpPositionClient {
    fn list_satellites(&self) -> impl Future<Output = Result<Vec<String>, ClientError>> + Send {
        async move { self.get_json(&["api", "satellites"]).await }
    }

    fn get_position(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<PositionSample, ClientError>> + Send {
        async move {
            let report: PositionReport = self.get_json(&["api", "position", name]).await?;
            Ok(report.into_sample(Utc::now()))
        }
    }
}
