//! Wire types for the public vehicle-data decode API.
//!
//! The service reports every decoded attribute as a string, with empty
//! strings for unknown fields; conversion normalises those to `None`.

use serde::Deserialize;

use crate::domain::vehicles::VinCandidate;

/// Top-level decode response.
#[derive(Debug, Deserialize)]
pub(crate) struct DecodeResponseDto {
    /// Decoded rows; the flat-format endpoint returns one per VIN.
    #[serde(rename = "Results", default)]
    pub results: Vec<DecodeResultDto>,
}

/// One decoded row.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DecodeResultDto {
    /// Vehicle make, e.g. `VOLKSWAGEN`.
    #[serde(rename = "Make", default)]
    pub make: String,
    /// Vehicle model, e.g. `Golf`.
    #[serde(rename = "Model", default)]
    pub model: String,
    /// Model year as text.
    #[serde(rename = "ModelYear", default)]
    pub model_year: String,
    /// Engine description, when reported.
    #[serde(rename = "EngineModel", default)]
    pub engine_model: String,
}

impl DecodeResponseDto {
    /// Convert decoded rows into domain candidates, dropping rows without a
    /// make and model.
    pub(crate) fn into_candidates(self) -> Vec<VinCandidate> {
        self.results
            .into_iter()
            .filter(|row| !row.make.trim().is_empty() && !row.model.trim().is_empty())
            .map(|row| VinCandidate {
                make: row.make.trim().to_owned(),
                model: row.model.trim().to_owned(),
                model_year: row.model_year.trim().parse().ok(),
                engine: {
                    let engine = row.engine_model.trim();
                    (!engine.is_empty()).then(|| engine.to_owned())
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_normalise_to_none() {
        let dto = DecodeResponseDto {
            results: vec![DecodeResultDto {
                make: "VOLKSWAGEN".to_owned(),
                model: "Golf".to_owned(),
                model_year: String::new(),
                engine_model: "  ".to_owned(),
            }],
        };
        let candidates = dto.into_candidates();
        assert_eq!(candidates.len(), 1);
        let candidate = candidates.first().expect("one candidate");
        assert!(candidate.model_year.is_none());
        assert!(candidate.engine.is_none());
    }

    #[test]
    fn rows_without_make_or_model_are_dropped() {
        let dto = DecodeResponseDto {
            results: vec![DecodeResultDto::default()],
        };
        assert!(dto.into_candidates().is_empty());
    }
}
