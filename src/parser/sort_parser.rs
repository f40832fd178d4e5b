use std::fmt;

use thiserror::Error;

/// Errors raised while turning a sort expression into a [`SortSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("Invalid sort expression: malformed token '{token}'")]
    InvalidSyntax { token: String },

    #[error("Sorting not allowed on attribute(s): {}", .paths.join(", "))]
    NotAllowed { paths: Vec<String> },
}

impl SortError {
    /// Offending inputs reported back to the client.
    pub fn offending(&self) -> Vec<String> {
        match self {
            SortError::InvalidSyntax { token } => vec![token.clone()],
            SortError::NotAllowed { paths } => paths.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One attribute to order by.
///
/// `segments` is never empty, and no entry is empty or contains whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    segments: Vec<String>,
    pub direction: SortDirection,
}

impl SortKey {
    /// Build a key from a dotted path such as `other.data`.
    pub fn new(path: &str, direction: SortDirection) -> Result<SortKey, SortError> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        let malformed = |segment: &String| {
            segment.is_empty() || segment.chars().any(char::is_whitespace)
        };
        if segments.iter().any(malformed) {
            return Err(SortError::InvalidSyntax {
                token: path.to_string(),
            });
        }
        Ok(SortKey {
            segments,
            direction,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Full dotted path, as written by the client.
    pub fn path(&self) -> String {
        self.segments.join(".")
    }

    /// Parse a single token: optional leading `-` followed by a dotted path.
    fn from_token(token: &str) -> Result<SortKey, SortError> {
        let (direction, path) = match token.strip_prefix('-') {
            Some(rest) => (SortDirection::Descending, rest.trim_start()),
            None => (SortDirection::Ascending, token),
        };

        SortKey::new(path, direction).map_err(|_| SortError::InvalidSyntax {
            token: token.to_string(),
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.direction == SortDirection::Descending {
            write!(f, "-")?;
        }
        write!(f, "{}", self.path())
    }
}

/// Ordered list of sort keys; the first key is the primary order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Parse a comma separated sort expression, e.g. `-other.data,email`.
    ///
    /// Whitespace around tokens is ignored. An empty expression yields an
    /// empty spec; any empty token inside a non-empty expression is rejected.
    pub fn parse(expression: &str) -> Result<SortSpec, SortError> {
        if expression.trim().is_empty() {
            return Ok(SortSpec::default());
        }

        let keys = expression
            .split(',')
            .map(|token| SortKey::from_token(token.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SortSpec { keys })
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}
