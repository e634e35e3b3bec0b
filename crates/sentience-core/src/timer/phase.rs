use serde::{Deserialize, Serialize};

/// Current alternation phase of the focus timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Working,
    Break,
}

impl Phase {
    /// The phase entered when this one completes.
    pub fn next(self) -> Self {
        match self {
            Phase::Working => Phase::Break,
            Phase::Break => Phase::Working,
        }
    }

    /// Kind of session record emitted when this phase completes.
    pub fn kind(self) -> SessionKind {
        match self {
            Phase::Working => SessionKind::Work,
            Phase::Break => SessionKind::Break,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Working => "working",
            Phase::Break => "break",
        }
    }
}

/// Type of a persisted focus session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Work,
    Break,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Work => "work",
            SessionKind::Break => "break",
        }
    }
}

impl std::str::FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "work" => Ok(SessionKind::Work),
            "break" => Ok(SessionKind::Break),
            other => Err(format!("unknown session type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_alternate() {
        assert_eq!(Phase::Working.next(), Phase::Break);
        assert_eq!(Phase::Break.next(), Phase::Working);
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SessionKind::Work).unwrap(), "\"work\"");
        assert_eq!(serde_json::to_string(&Phase::Break).unwrap(), "\"break\"");
        assert_eq!("Break".parse::<SessionKind>().unwrap(), SessionKind::Break);
        assert!("nap".parse::<SessionKind>().is_err());
    }
}
