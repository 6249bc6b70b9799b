use crate::validation::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-empty text without ASCII control characters.
const PRINTABLE: &str = r"^[^\x00-\x1f\x7f]+$";

macro_rules! newtype {
    ($name:ident, $doc:expr, $pattern:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new instance without validation; callers are responsible for conformity.
            pub fn new(value: String) -> Self {
                Self(value)
            }

            /// Parses a validated identifier from a string.
            pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if !Regex::new($pattern).expect("invalid regex").is_match(&s) {
                    return Err(ValidationError::PatternMismatch {
                        field: stringify!($name),
                        value: s,
                    });
                }
                Ok(Self(s))
            }

            /// Borrows the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

newtype!(
    Identity,
    "Account identifier sent in the query string; not part of the signed content.",
    PRINTABLE
);
newtype!(
    Tournament,
    "Name of the grouping under which choices are evaluated.",
    PRINTABLE
);
newtype!(
    Uid,
    "Correlation id linking a choose request to a later action.",
    PRINTABLE
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_empty_and_control_characters() {
        assert!(Tournament::parse("").is_err());
        assert!(Tournament::parse("a\nb").is_err());
        assert_eq!(Tournament::parse("spring sale").unwrap().as_str(), "spring sale");
    }
}
