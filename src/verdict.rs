//! Public verdict vocabulary and outcome classification.

use crate::error::{FeedError, FeedResult};

/// Publicly visible result of a submission.
///
/// `Pending` (not judged yet) and `Hidden` (judged, but redacted by the
/// freeze policy) are distinct states internally but serialize identically
/// as an empty result string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicVerdict {
    /// Accepted
    Yes,
    /// Output does not match expected
    WrongAnswer,
    /// Exceeded time limit
    TimeLimitExceeded,
    /// Program crashed or non-zero exit
    RuntimeError,
    /// Compilation failed
    CompilationError,
    /// Output too large
    OutputLimitExceeded,
    /// Rejected for any other reason
    Other,
    /// No authoritative judgement yet
    Pending,
    /// Verdict exists but is redacted while the scoreboard is frozen
    Hidden,
}

impl PublicVerdict {
    /// Classify a backend outcome code.
    ///
    /// The table covers both backend generations: the legacy API's outcome
    /// strings and the contest API's judgement type ids. `None` means the
    /// submission has no authoritative judgement. Any other code is refused
    /// outright rather than published as a blank result.
    pub fn classify(code: Option<&str>) -> FeedResult<Self> {
        let Some(code) = code else {
            return Ok(PublicVerdict::Pending);
        };

        match code {
            "correct" | "AC" => Ok(PublicVerdict::Yes),
            "wrong-answer" | "WA" => Ok(PublicVerdict::WrongAnswer),
            "timelimit" | "TLE" => Ok(PublicVerdict::TimeLimitExceeded),
            "run-error" | "RE" | "RTE" => Ok(PublicVerdict::RuntimeError),
            "compiler-error" | "CE" => Ok(PublicVerdict::CompilationError),
            "output-limit" | "OLE" => Ok(PublicVerdict::OutputLimitExceeded),
            "no-output" | "NO" => Ok(PublicVerdict::Other),
            "judging" | "JU" => Ok(PublicVerdict::Pending),
            other => Err(FeedError::UnknownVerdict(other.to_string())),
        }
    }

    /// Wire representation used in the runs document.
    pub fn result_str(&self) -> &'static str {
        match self {
            PublicVerdict::Yes => "Yes",
            PublicVerdict::WrongAnswer => "No - Wrong Answer",
            PublicVerdict::TimeLimitExceeded => "No - Time Limit Exceeded",
            PublicVerdict::RuntimeError => "No - Run-time Error",
            PublicVerdict::CompilationError => "No - Compilation Error",
            PublicVerdict::OutputLimitExceeded => "No - Output Limit Exceeded",
            PublicVerdict::Other => "No - Other",
            PublicVerdict::Pending | PublicVerdict::Hidden => "",
        }
    }

}

impl std::fmt::Display for PublicVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result_str())
    }
}
