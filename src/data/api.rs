use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};

use super::loader;
use super::model::{Measurement, Sample};
use crate::error::DataError;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Reply to a POST.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Form body for `POST /samples`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewSample {
    pub id: String,
    pub nome: String,
    pub tipo: String,
    #[serde(rename = "operadorResponsavel")]
    pub operador_responsavel: String,
}

/// Form body for `POST /measurements`. `area` is in µm².
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewMeasurement {
    pub id: String,
    #[serde(rename = "sampleId")]
    pub sample_id: String,
    pub area: f64,
    #[serde(rename = "imagemId", skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(rename = "nomeImagem", skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Blocking client for the measurement REST API. Call it off the UI
/// thread.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DataError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn check_status(path: &str, resp: Response) -> Result<Response, DataError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(DataError::NetworkUnavailable(format!("{path}: HTTP {status}")))
        }
    }

    fn get_text(&self, path: &str) -> Result<String, DataError> {
        let resp = self.http.get(self.url(path)).send()?;
        Ok(Self::check_status(path, resp)?.text()?)
    }

    /// `GET /health`; any 2xx counts as up.
    pub fn health(&self) -> Result<(), DataError> {
        let resp = self.http.get(self.url("health")).send()?;
        Self::check_status("health", resp).map(|_| ())
    }

    pub fn measurements(&self) -> Result<Vec<Measurement>, DataError> {
        loader::parse_measurements(&self.get_text("measurements")?)
    }

    pub fn samples(&self) -> Result<Vec<Sample>, DataError> {
        loader::parse_samples(&self.get_text("samples")?)
    }

    pub fn create_sample(&self, sample: &NewSample) -> Result<ApiResponse, DataError> {
        self.post_form("samples", sample)
    }

    pub fn create_measurement(
        &self,
        measurement: &NewMeasurement,
    ) -> Result<ApiResponse, DataError> {
        self.post_form("measurements", measurement)
    }

    fn post_form<T>(&self, path: &str, body: &T) -> Result<ApiResponse, DataError>
    where
        T: Serialize + ?Sized,
    {
        let resp = self.http.post(self.url(path)).form(body).send()?;
        let reply: ApiResponse = Self::check_status(path, resp)?.json()?;
        if reply.success {
            Ok(reply)
        } else {
            Err(DataError::Rejected(
                reply
                    .message
                    .unwrap_or_else(|| "no message from server".to_string()),
            ))
        }
    }
}
