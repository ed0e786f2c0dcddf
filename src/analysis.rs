use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Clinical severity reported for an interaction.
///
/// The model is asked for one of the four known values, but any other string
/// is kept verbatim so it can still be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Minor,
    Moderate,
    Major,
    Contraindicated,
    Unrecognized(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Major => "Major",
            Self::Contraindicated => "Contraindicated",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl FromStr for Severity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let severity = match s.trim().to_ascii_lowercase().as_str() {
            "minor" => Self::Minor,
            "moderate" => Self::Moderate,
            "major" => Self::Major,
            "contraindicated" => Self::Contraindicated,
            _ => Self::Unrecognized(s.to_string()),
        };
        Ok(severity)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_str(&raw).unwrap_or_else(|never| match never {}))
    }
}

/// One reported interaction between two or more drugs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub severity: Severity,
    pub drugs: Vec<String>,
    pub mechanism: String,
    pub clinical_effect: String,
    pub recommendation: String,
}

/// Validated model output. Interactions keep the order the service returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub interactions: Vec<InteractionRecord>,
    pub summary: String,
}

impl AnalysisResult {
    pub fn count(&self) -> usize {
        self.interactions.len()
    }
}

/// How to treat a severity outside the four known values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeverityPolicy {
    /// Keep the record and render it with the neutral tier.
    #[default]
    Lenient,
    /// Reject the whole response.
    Strict,
}

impl FromStr for SeverityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown severity policy '{}', expected 'lenient' or 'strict'",
                other
            )),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("response is not valid analysis JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("interaction #{index} has unrecognized severity '{severity}'")]
    UnrecognizedSeverity { index: usize, severity: String },
}

/// Parse the model's text payload into an [`AnalysisResult`].
///
/// Every field is required; a response missing any of them is rejected as a
/// whole rather than partially accepted.
pub fn parse_analysis(text: &str, policy: SeverityPolicy) -> Result<AnalysisResult, AnalysisError> {
    let result: AnalysisResult = serde_json::from_str(text.trim())?;

    if policy == SeverityPolicy::Strict {
        if let Some((index, record)) = result
            .interactions
            .iter()
            .enumerate()
            .find(|(_, r)| !r.severity.is_recognized())
        {
            return Err(AnalysisError::UnrecognizedSeverity {
                index,
                severity: record.severity.to_string(),
            });
        }
    }

    Ok(result)
}
