use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named view predicate, evaluated at read time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Filter {
    #[default]
    All,
    Completed,
    Pending,
    Overdue,
}

impl Filter {
    pub const ALL: [Filter; 4] = [Filter::All, Filter::Completed, Filter::Pending, Filter::Overdue];

    pub fn name(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Completed => "completed",
            Filter::Pending => "pending",
            Filter::Overdue => "overdue",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A filter name outside the four known ones
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter '{0}' (expected: all, completed, pending, overdue)")]
pub struct UnknownFilter(pub String);

impl FromStr for Filter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Filter::ALL
            .into_iter()
            .find(|f| f.name() == lowered)
            .ok_or_else(|| UnknownFilter(s.to_string()))
    }
}

impl TryFrom<String> for Filter {
    type Error = UnknownFilter;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        for f in Filter::ALL {
            assert_eq!(f.name().parse::<Filter>().unwrap(), f);
        }
        assert_eq!("Overdue".parse::<Filter>().unwrap(), Filter::Overdue);
        assert_eq!(" pending ".parse::<Filter>().unwrap(), Filter::Pending);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "done".parse::<Filter>().unwrap_err();
        assert_eq!(err, UnknownFilter("done".into()));
        assert!("".parse::<Filter>().is_err());
    }

    #[test]
    fn test_serde_uses_the_same_names_as_parse() {
        let f: Filter = serde_json::from_str("\"Pending\"").unwrap();
        assert_eq!(f, Filter::Pending);
        assert_eq!(serde_json::to_string(&Filter::Overdue).unwrap(), "\"overdue\"");
        let err = serde_json::from_str::<Filter>("\"done\"").unwrap_err();
        assert!(err.to_string().contains("unknown filter 'done'"));
    }
}
