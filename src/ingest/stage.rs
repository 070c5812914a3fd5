use std::fmt;

/// Where a submission is in the ingestion pipeline
///
/// ```text
/// Validating -> Fetching -> Extracting -> Classifying -> Persisting -> Done
///     |             |            |
///     v             +------------+--> Degraded (record stored with a status category)
/// RejectedInput (nothing stored)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Validating,
    Fetching,
    Extracting,
    Classifying,
    Persisting,
    Done,
    RejectedInput,
    Degraded,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Classifying => "classifying",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::RejectedInput => "rejected-input",
            Self::Degraded => "degraded",
        }
    }

    /// True for stages after which nothing else happens to the submission
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::RejectedInput | Self::Degraded)
    }
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
