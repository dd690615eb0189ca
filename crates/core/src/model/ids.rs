use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an Exam
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExamId(u64);

impl ExamId {
    /// Creates a new `ExamId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Unique identifier for a Question
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(u64);

impl QuestionId {
    /// Creates a new `QuestionId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ExamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExamId({})", self.0)
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for ExamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to parse {kind} from string")]
pub struct ParseIdError {
    kind: String,
}

impl FromStr for ExamId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(ExamId::new).map_err(|_| ParseIdError {
            kind: "ExamId".to_string(),
        })
    }
}

impl FromStr for QuestionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(QuestionId::new)
            .map_err(|_| ParseIdError {
                kind: "QuestionId".to_string(),
            })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exam_id_display() {
        let id = ExamId::new(42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_exam_id_from_str() {
        let id: ExamId = "123".parse().unwrap();
        assert_eq!(id, ExamId::new(123));
    }

    #[test]
    fn test_exam_id_from_str_invalid() {
        let result = "not-a-number".parse::<ExamId>();
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_id_error_names_the_type() {
        let err = "nope".parse::<QuestionId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse QuestionId from string");
    }

    #[test]
    fn test_question_id_display() {
        let id = QuestionId::new(99);
        assert_eq!(id.to_string(), "99");
    }

    #[test]
    fn test_question_id_from_str() {
        let id: QuestionId = "456".parse().unwrap();
        assert_eq!(id, QuestionId::new(456));
    }

    #[test]
    fn test_question_id_map_key_serializes_as_string() {
        // JSON object keys are strings; progress snapshots rely on this shape.
        let mut map = std::collections::HashMap::new();
        map.insert(QuestionId::new(7), "x");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"7":"x"}"#);
    }
}
