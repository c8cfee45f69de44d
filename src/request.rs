//! Conversion request context shared across the converter pipeline.

/// What kind of result the client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    /// Normal conversion.
    Conversion,
    /// Reverse conversion (surface to reading).
    ReverseConversion,
    /// Prediction shown on an explicit key (e.g. Tab).
    Prediction,
    /// Prediction shown automatically while typing.
    Suggestion,
    /// Prediction using only the text before the cursor.
    PartialPrediction,
    /// Suggestion using only the text before the cursor.
    PartialSuggestion,
}

impl RequestType {
    /// True for all prediction-like requests, partial or not.
    pub fn is_prediction(self) -> bool {
        matches!(
            self,
            RequestType::Prediction
                | RequestType::Suggestion
                | RequestType::PartialPrediction
                | RequestType::PartialSuggestion
        )
    }

    /// True when the request consumes only a prefix of the composition.
    pub fn is_partial(self) -> bool {
        matches!(
            self,
            RequestType::PartialPrediction | RequestType::PartialSuggestion
        )
    }
}

/// Per-request parameters handed down from the session layer.
///
/// The composition buffer itself stays outside this core; the request
/// carries only the reading it produced.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    request_type: RequestType,
    key: String,
}

impl ConversionRequest {
    pub fn new(request_type: RequestType, key: &str) -> Self {
        Self {
            request_type,
            key: key.to_string(),
        }
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    /// The reading produced by the composer for this request.
    pub fn key(&self) -> &str {
        &self.key
    }
}
