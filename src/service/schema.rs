//! Wire schema of the match service.
//!
//! Requests carry the document and stored snapshots as base64; responses
//! carry one record per ordinal in one of four shapes:
//! `{pass: true, diffRatio}`, `{pass: false, diffRatio, newPage, diffImage}`,
//! `{added: true, newPage}` or `{deleted: true}`.

use crate::raster::{decode_base64, encode_base64, RasterPage};
use crate::reconcile::{DiffOutcome, MatchReport};
use crate::utils::config::{
    DEFAULT_FAILURE_THRESHOLD, DEFAULT_SCALE, MAX_REQUEST_SCALE, MIN_REQUEST_SCALE,
};
use crate::utils::error::{ImageError, MatchError};
use serde::{Deserialize, Serialize};

/// Rendering and comparison options of one match
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<f64>,
}

impl MatchOptions {
    pub fn scale(&self) -> f64 {
        self.scale.unwrap_or(DEFAULT_SCALE)
    }

    pub fn failure_threshold(&self) -> f64 {
        self.failure_threshold.unwrap_or(DEFAULT_FAILURE_THRESHOLD)
    }

    /// Enforce `scale` in [1, 10] and `failureThreshold` in [0, 1]
    pub fn validate(&self) -> Result<(), MatchError> {
        if let Some(scale) = self.scale {
            if !(MIN_REQUEST_SCALE..=MAX_REQUEST_SCALE).contains(&scale) {
                return Err(MatchError::InvalidUsage(format!(
                    "scale must be within [{}, {}], got {}",
                    MIN_REQUEST_SCALE, MAX_REQUEST_SCALE, scale
                )));
            }
        }

        if let Some(threshold) = self.failure_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(MatchError::InvalidUsage(format!(
                    "failureThreshold must be within [0, 1], got {}",
                    threshold
                )));
            }
        }

        Ok(())
    }
}

/// Incoming match request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    /// Base64 PDF document
    pub pdf: String,

    /// Base64 PNG snapshots in ordinal order
    #[serde(default)]
    pub snapshots: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<MatchOptions>,
}

/// A request whose payloads have been decoded and checked
#[derive(Debug, Clone)]
pub struct DecodedRequest {
    pub pdf: Vec<u8>,
    pub snapshots: Vec<RasterPage>,
    pub options: MatchOptions,
}

impl MatchRequest {
    /// Build a request from raw document bytes and decoded snapshots
    pub fn encode(
        pdf: &[u8],
        snapshots: &[RasterPage],
        options: MatchOptions,
    ) -> Result<Self, ImageError> {
        let snapshots = snapshots
            .iter()
            .map(RasterPage::to_base64)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            pdf: encode_base64(pdf),
            snapshots,
            options: Some(options),
        })
    }

    /// Decode every payload and validate options.
    ///
    /// # Errors
    /// * `MatchError::InvalidUsage` - On out-of-range options, bad base64 or
    ///   snapshots that are not PNG images
    pub fn decode(&self) -> Result<DecodedRequest, MatchError> {
        let options = self.options.unwrap_or_default();
        options.validate()?;

        let pdf = decode_base64(&self.pdf)
            .map_err(|e| MatchError::InvalidUsage(format!("pdf payload: {}", e)))?;

        let snapshots = self
            .snapshots
            .iter()
            .enumerate()
            .map(|(index, encoded)| {
                RasterPage::from_base64(encoded).map_err(|e| {
                    MatchError::InvalidUsage(format!("snapshot {}: {}", index + 1, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DecodedRequest {
            pdf,
            snapshots,
            options,
        })
    }
}

/// Result of one ordinal on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPageResult", into = "RawPageResult")]
pub enum PageResult {
    Pass {
        diff_ratio: f64,
    },
    Fail {
        diff_ratio: f64,
        new_page: String,
        diff_image: String,
    },
    Added {
        new_page: String,
    },
    Deleted,
}

/// Flat record with every optional field, used to (de)serialize the
/// property-presence shapes of [`PageResult`]
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPageResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pass: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    diff_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    diff_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    added: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deleted: Option<bool>,
}

impl TryFrom<RawPageResult> for PageResult {
    type Error = String;

    fn try_from(raw: RawPageResult) -> Result<Self, Self::Error> {
        match raw {
            RawPageResult {
                deleted: Some(true),
                ..
            } => Ok(PageResult::Deleted),
            RawPageResult {
                added: Some(true),
                new_page: Some(new_page),
                ..
            } => Ok(PageResult::Added { new_page }),
            RawPageResult {
                pass: Some(true),
                diff_ratio: Some(diff_ratio),
                ..
            } => Ok(PageResult::Pass { diff_ratio }),
            RawPageResult {
                pass: Some(false),
                diff_ratio: Some(diff_ratio),
                new_page: Some(new_page),
                diff_image: Some(diff_image),
                ..
            } => Ok(PageResult::Fail {
                diff_ratio,
                new_page,
                diff_image,
            }),
            other => Err(format!("unrecognized page result: {:?}", other)),
        }
    }
}

impl From<PageResult> for RawPageResult {
    fn from(result: PageResult) -> Self {
        match result {
            PageResult::Pass { diff_ratio } => RawPageResult {
                pass: Some(true),
                diff_ratio: Some(diff_ratio),
                ..Default::default()
            },
            PageResult::Fail {
                diff_ratio,
                new_page,
                diff_image,
            } => RawPageResult {
                pass: Some(false),
                diff_ratio: Some(diff_ratio),
                new_page: Some(new_page),
                diff_image: Some(diff_image),
                ..Default::default()
            },
            PageResult::Added { new_page } => RawPageResult {
                added: Some(true),
                new_page: Some(new_page),
                ..Default::default()
            },
            PageResult::Deleted => RawPageResult {
                deleted: Some(true),
                ..Default::default()
            },
        }
    }
}

impl PageResult {
    pub fn from_outcome(outcome: &DiffOutcome) -> Result<Self, ImageError> {
        Ok(match outcome {
            DiffOutcome::Matched { diff_ratio } => PageResult::Pass {
                diff_ratio: *diff_ratio,
            },
            DiffOutcome::Changed {
                diff_ratio,
                new_page,
                diff_visualization,
            } => PageResult::Fail {
                diff_ratio: *diff_ratio,
                new_page: new_page.to_base64()?,
                diff_image: diff_visualization.to_base64()?,
            },
            DiffOutcome::Added { new_page } => PageResult::Added {
                new_page: new_page.to_base64()?,
            },
            DiffOutcome::Deleted => PageResult::Deleted,
        })
    }

    pub fn into_outcome(self) -> Result<DiffOutcome, ImageError> {
        Ok(match self {
            PageResult::Pass { diff_ratio } => DiffOutcome::Matched { diff_ratio },
            PageResult::Fail {
                diff_ratio,
                new_page,
                diff_image,
            } => DiffOutcome::Changed {
                diff_ratio,
                new_page: RasterPage::from_base64(&new_page)?,
                diff_visualization: RasterPage::from_base64(&diff_image)?,
            },
            PageResult::Added { new_page } => DiffOutcome::Added {
                new_page: RasterPage::from_base64(&new_page)?,
            },
            PageResult::Deleted => DiffOutcome::Deleted,
        })
    }
}

/// Service response: one record per ordinal, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub results: Vec<PageResult>,
}

impl MatchResponse {
    pub fn from_report(report: &MatchReport) -> Result<Self, ImageError> {
        let results = report
            .outcomes()
            .iter()
            .map(PageResult::from_outcome)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { results })
    }

    pub fn into_report(self) -> Result<MatchReport, ImageError> {
        let outcomes = self
            .results
            .into_iter()
            .map(PageResult::into_outcome)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MatchReport::new(outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_shapes() {
        let results = vec![
            PageResult::Pass { diff_ratio: 0.0 },
            PageResult::Fail {
                diff_ratio: 0.5,
                new_page: "AAA=".to_string(),
                diff_image: "BBB=".to_string(),
            },
            PageResult::Added {
                new_page: "CCC=".to_string(),
            },
            PageResult::Deleted,
        ];

        let value = serde_json::to_value(MatchResponse { results }).unwrap();

        assert_eq!(
            value,
            json!({
                "results": [
                    {"pass": true, "diffRatio": 0.0},
                    {"pass": false, "diffRatio": 0.5, "newPage": "AAA=", "diffImage": "BBB="},
                    {"added": true, "newPage": "CCC="},
                    {"deleted": true}
                ]
            })
        );
    }

    #[test]
    fn test_parse_records() {
        let response: MatchResponse = serde_json::from_value(json!({
            "results": [{"deleted": true}, {"pass": true, "diffRatio": 0.1}]
        }))
        .unwrap();

        assert_eq!(
            response.results,
            vec![PageResult::Deleted, PageResult::Pass { diff_ratio: 0.1 }]
        );
    }

    #[test]
    fn test_unknown_record_rejected() {
        let parsed: Result<PageResult, _> = serde_json::from_value(json!({"pass": false}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_request_defaults() {
        let request: MatchRequest = serde_json::from_value(json!({"pdf": "JVBERi0="})).unwrap();
        assert!(request.snapshots.is_empty());
        assert!(request.options.is_none());

        let decoded = request.decode().unwrap();
        assert_eq!(decoded.pdf, b"%PDF-");
        assert_eq!(decoded.options.scale(), 1.0);
        assert_eq!(decoded.options.failure_threshold(), 0.0);
    }

    #[test]
    fn test_request_option_bounds() {
        let request: MatchRequest = serde_json::from_value(json!({
            "pdf": "JVBERi0=",
            "options": {"scale": 0.5}
        }))
        .unwrap();
        assert!(matches!(request.decode(), Err(MatchError::InvalidUsage(_))));

        let request: MatchRequest = serde_json::from_value(json!({
            "pdf": "JVBERi0=",
            "options": {"failureThreshold": 1.5}
        }))
        .unwrap();
        assert!(matches!(request.decode(), Err(MatchError::InvalidUsage(_))));
    }

    #[test]
    fn test_bad_snapshot_payload_is_invalid_usage() {
        let request = MatchRequest {
            pdf: "JVBERi0=".to_string(),
            snapshots: vec!["bm90IGEgcG5n".to_string()],
            options: None,
        };
        assert!(matches!(request.decode(), Err(MatchError::InvalidUsage(_))));
    }
}
