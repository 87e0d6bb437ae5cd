//! HTTP client for a remote match service.

use super::types::{ServiceResponse, MATCH_PROCEDURE};
use crate::raster::RasterPage;
use crate::reconcile::MatchReport;
use crate::service::{MatchEngine, MatchOptions, MatchRequest, MatchResponse};
use crate::utils::config::DEFAULT_RPC_TIMEOUT;
use crate::utils::error::{MatchError, RpcError};
use log::{debug, info};
use reqwest::blocking::Client;

/// Client posting match requests to a remote service
pub struct RpcClient {
    client: Client,
    endpoint: String,
}

impl RpcClient {
    /// Create a new client for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(DEFAULT_RPC_TIMEOUT)
            .build()
            .map_err(RpcError::RequestFailed)?;

        Ok(Self {
            client,
            endpoint: procedure_url(&base_url.into()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one request and decode the response envelope
    pub fn match_pdf_snapshot(&self, request: &MatchRequest) -> Result<MatchResponse, RpcError> {
        info!("Requesting match from: {}", self.endpoint);
        debug!(
            "Request carries {} snapshot(s), {} base64 bytes of pdf",
            request.snapshots.len(),
            request.pdf.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(RpcError::RequestFailed)?;

        let status = response.status();
        let body = response.text().map_err(RpcError::RequestFailed)?;

        let envelope: ServiceResponse<MatchResponse> =
            serde_json::from_str(&body).map_err(|e| {
                RpcError::InvalidResponse(format!("HTTP {}: {} ({})", status, e, truncate(&body)))
            })?;

        if let Some(error) = envelope.error {
            return Err(RpcError::Remote {
                code: error.code_string(),
                message: error.message,
            });
        }

        if !status.is_success() {
            return Err(RpcError::InvalidResponse(format!(
                "HTTP {}: {}",
                status,
                truncate(&body)
            )));
        }

        envelope
            .result
            .map(|result| result.data)
            .ok_or_else(|| RpcError::InvalidResponse("Missing result field".to_string()))
    }
}

impl MatchEngine for RpcClient {
    fn match_document(
        &self,
        pdf: &[u8],
        snapshots: &[RasterPage],
        options: &MatchOptions,
    ) -> Result<MatchReport, MatchError> {
        let request = MatchRequest::encode(pdf, snapshots, *options)?;
        let response = self.match_pdf_snapshot(&request)?;
        Ok(response.into_report()?)
    }
}

/// `<base>/matchPdfSnapshot`, tolerating a trailing slash
fn procedure_url(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), MATCH_PROCEDURE)
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((index, _)) => format!("{}...", &body[..index]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedure_url() {
        assert_eq!(
            procedure_url("http://localhost:3000"),
            "http://localhost:3000/matchPdfSnapshot"
        );
        assert_eq!(
            procedure_url("http://localhost:3000/"),
            "http://localhost:3000/matchPdfSnapshot"
        );
    }

    #[test]
    fn test_truncate_long_bodies() {
        let body = "x".repeat(500);
        assert_eq!(truncate(&body).len(), 203);
        assert_eq!(truncate("short"), "short");
    }
}
