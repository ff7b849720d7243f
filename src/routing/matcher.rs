//! Route pattern matching.
//!
//! # Responsibilities
//! - Compile `/api/listings/:id` style patterns at registration time
//! - Match a request path against the whole pattern (anchored)
//! - Bind `:name` segments to the path segment they matched
//!
//! # Design Decisions
//! - A placeholder matches exactly one non-empty, slash-free segment
//! - Literal segments compare case-sensitively
//! - Trailing slashes are literal: `/a/` and `/a` are different patterns
//! - No regex: segment-by-segment comparison is O(segments)

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern must start with '/': {0}")]
    MissingLeadingSlash(String),

    #[error("empty placeholder name in pattern: {0}")]
    EmptyPlaceholder(String),

    #[error("placeholder ':{name}' appears twice in pattern: {pattern}")]
    DuplicatePlaceholder { name: String, pattern: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Named values captured from a matched path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        }

        let mut segments = Vec::new();
        let mut names: Vec<&str> = Vec::new();
        for part in pattern[1..].split('/') {
            if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(PatternError::EmptyPlaceholder(pattern.to_string()));
                }
                if names.contains(&name) {
                    return Err(PatternError::DuplicatePlaceholder {
                        name: name.to_string(),
                        pattern: pattern.to_string(),
                    });
                }
                names.push(name);
                segments.push(Segment::Param(name.to_string()));
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match the full path, returning bound parameters on success.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(PathParams(params))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match() {
        let pattern = PathPattern::parse("/api/health").unwrap();
        assert!(pattern.matches("/api/health").is_some());
        assert!(pattern.matches("/api/Health").is_none());
        assert!(pattern.matches("/api/health/").is_none());
    }

    #[test]
    fn test_placeholder_binds_segment() {
        let pattern = PathPattern::parse("/api/listings/:id").unwrap();
        let params = pattern.matches("/api/listings/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_match_is_anchored() {
        let pattern = PathPattern::parse("/api/x/:id").unwrap();
        assert!(pattern.matches("/api/x/1/extra").is_none());
        assert!(pattern.matches("/prefix/api/x/1").is_none());
        assert!(pattern.matches("/api/x").is_none());
    }

    #[test]
    fn test_placeholder_requires_non_empty_segment() {
        let pattern = PathPattern::parse("/api/x/:id").unwrap();
        assert!(pattern.matches("/api/x/").is_none());
    }

    #[test]
    fn test_trailing_slash_is_literal() {
        let pattern = PathPattern::parse("/api/listings/").unwrap();
        assert!(pattern.matches("/api/listings/").is_some());
        assert!(pattern.matches("/api/listings").is_none());
    }

    #[test]
    fn test_multiple_placeholders() {
        let pattern = PathPattern::parse("/api/chat/:room/messages/:message").unwrap();
        let params = pattern.matches("/api/chat/7/messages/99").unwrap();
        assert_eq!(params.get("room"), Some("7"));
        assert_eq!(params.get("message"), Some("99"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            PathPattern::parse("api/x"),
            Err(PatternError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            PathPattern::parse("/api/:"),
            Err(PatternError::EmptyPlaceholder(_))
        ));
        assert!(matches!(
            PathPattern::parse("/a/:id/b/:id"),
            Err(PatternError::DuplicatePlaceholder { .. })
        ));
    }
}
