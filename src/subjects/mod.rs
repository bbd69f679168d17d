//! Subject naming and pattern matching
//!
//! Subjects are dot-separated tokens: `chat.0xE540...dC08.outbox`
//! Each token must match: [a-zA-Z0-9_-]+
//!
//! Patterns may use two wildcards:
//! - `*` matches exactly one token, anywhere: `*.0xabc.>` matches any
//!   subject whose second token is `0xabc`
//! - `>` matches one or more trailing tokens and must be the last token:
//!   `_INBOX.>` matches `_INBOX.reply.1` but not `_INBOX` itself
//! - `>` alone matches every subject

use std::fmt;
use thiserror::Error;

/// Valid characters for a subject token
fn is_valid_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Validate a single literal token
fn is_valid_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_valid_token_char)
}

#[derive(Debug, Error)]
pub enum SubjectError {
    #[error("subject cannot be empty")]
    Empty,

    #[error("invalid token '{0}': must match [a-zA-Z0-9_-]+")]
    InvalidToken(String),

    #[error("empty token in subject")]
    EmptyToken,

    #[error("'>' must be the last token of a pattern")]
    TailNotLast,

    #[error("wildcards are not allowed in a concrete subject")]
    WildcardInSubject,
}

/// A validated concrete subject name (no wildcards)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subject {
    tokens: Vec<String>,
}

impl Subject {
    /// Parse and validate a subject name
    pub fn parse(name: &str) -> Result<Self, SubjectError> {
        if name.is_empty() {
            return Err(SubjectError::Empty);
        }

        let mut tokens = Vec::new();
        for part in name.split('.') {
            if part.is_empty() {
                return Err(SubjectError::EmptyToken);
            }
            if part == "*" || part == ">" {
                return Err(SubjectError::WildcardInSubject);
            }
            if !is_valid_token(part) {
                return Err(SubjectError::InvalidToken(part.to_string()));
            }
            tokens.push(part.to_string());
        }

        Ok(Self { tokens })
    }

    /// Get the number of tokens
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Get a specific token by index
    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join("."))
    }
}

/// One token of a subject pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PatternToken {
    Literal(String),
    /// `*` - exactly one token
    Any,
    /// `>` - one or more trailing tokens
    Tail,
}

/// A subject pattern that may contain `*` and trailing `>` wildcards
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectPattern {
    tokens: Vec<PatternToken>,
}

impl SubjectPattern {
    /// Parse a subject pattern
    pub fn parse(pattern: &str) -> Result<Self, SubjectError> {
        if pattern.is_empty() {
            return Err(SubjectError::Empty);
        }

        let parts: Vec<&str> = pattern.split('.').collect();
        let mut tokens = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            match *part {
                "" => return Err(SubjectError::EmptyToken),
                "*" => tokens.push(PatternToken::Any),
                ">" => {
                    if i + 1 != parts.len() {
                        return Err(SubjectError::TailNotLast);
                    }
                    tokens.push(PatternToken::Tail);
                }
                p => {
                    if !is_valid_token(p) {
                        return Err(SubjectError::InvalidToken(p.to_string()));
                    }
                    tokens.push(PatternToken::Literal(p.to_string()));
                }
            }
        }

        Ok(Self { tokens })
    }

    /// Check if this pattern matches a concrete subject
    pub fn matches(&self, subject: &Subject) -> bool {
        let mut i = 0;

        for token in &self.tokens {
            match token {
                PatternToken::Tail => {
                    // `>` requires at least one remaining subject token
                    return i < subject.tokens.len();
                }
                PatternToken::Any => {
                    if i >= subject.tokens.len() {
                        return false;
                    }
                    i += 1;
                }
                PatternToken::Literal(lit) => {
                    if subject.tokens.get(i).map(String::as_str) != Some(lit.as_str()) {
                        return false;
                    }
                    i += 1;
                }
            }
        }

        i == subject.tokens.len()
    }

    /// Check if this pattern contains any wildcard
    pub fn is_wildcard(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, PatternToken::Any | PatternToken::Tail))
    }
}

impl fmt::Display for SubjectPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in &self.tokens {
            if !first {
                write!(f, ".")?;
            }
            first = false;
            match token {
                PatternToken::Literal(s) => write!(f, "{}", s)?,
                PatternToken::Any => write!(f, "*")?,
                PatternToken::Tail => write!(f, ">")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_parse_valid() {
        assert!(Subject::parse("chat").is_ok());
        assert!(Subject::parse("chat.0xabc123").is_ok());
        assert!(Subject::parse("chat.0xabc123.outbox").is_ok());
        assert!(Subject::parse("_INBOX.reply-1").is_ok());
        assert!(Subject::parse("agent.worker_5.status").is_ok());
    }

    #[test]
    fn test_subject_parse_invalid() {
        assert!(Subject::parse("").is_err());
        assert!(Subject::parse("chat..outbox").is_err());
        assert!(Subject::parse("chat.*.outbox").is_err());
        assert!(Subject::parse("chat.>").is_err());
        assert!(Subject::parse("chat.ab cd").is_err());
        assert!(Subject::parse("chat.ab@cd").is_err());
    }

    #[test]
    fn test_subject_tokens() {
        let s = Subject::parse("chat.0xabc.outbox").unwrap();
        assert_eq!(s.token_count(), 3);
        assert_eq!(s.token(1), Some("0xabc"));
        assert_eq!(s.token(3), None);
    }

    #[test]
    fn test_pattern_parse_valid() {
        assert!(SubjectPattern::parse("chat.0xabc").is_ok());
        assert!(SubjectPattern::parse("*.0xabc.>").is_ok());
        assert!(SubjectPattern::parse("_INBOX.>").is_ok());
        assert!(SubjectPattern::parse(">").is_ok());
        assert!(SubjectPattern::parse("*").is_ok());
    }

    #[test]
    fn test_pattern_parse_invalid() {
        assert!(SubjectPattern::parse("").is_err());
        assert!(SubjectPattern::parse(">.chat").is_err());
        assert!(SubjectPattern::parse("chat.>.outbox").is_err());
        assert!(SubjectPattern::parse("chat..*").is_err());
        assert!(SubjectPattern::parse("ch at.*").is_err());
    }

    #[test]
    fn test_tail_matches_everything_nonempty() {
        let all = SubjectPattern::parse(">").unwrap();
        assert!(all.matches(&Subject::parse("chat").unwrap()));
        assert!(all.matches(&Subject::parse("chat.0xabc.outbox").unwrap()));
    }

    #[test]
    fn test_second_token_wildcard() {
        // The restricted-scope publish shape: second token pinned to an identity
        let p = SubjectPattern::parse("*.0xabc.>").unwrap();

        assert!(p.matches(&Subject::parse("chat.0xabc.outbox").unwrap()));
        assert!(p.matches(&Subject::parse("anything.0xabc.a.b.c").unwrap()));
        assert!(!p.matches(&Subject::parse("chat.0xdef.outbox").unwrap()));
        assert!(!p.matches(&Subject::parse("chat.0xabc").unwrap())); // `>` needs a tail
        assert!(!p.matches(&Subject::parse("0xabc.outbox").unwrap()));
    }

    #[test]
    fn test_inbox_pattern() {
        let p = SubjectPattern::parse("_INBOX.>").unwrap();

        assert!(p.matches(&Subject::parse("_INBOX.reply.1").unwrap()));
        assert!(!p.matches(&Subject::parse("_INBOX").unwrap()));
        assert!(!p.matches(&Subject::parse("chat._INBOX.x").unwrap()));
    }

    #[test]
    fn test_star_matches_exactly_one_token() {
        let p = SubjectPattern::parse("chat.*").unwrap();

        assert!(p.matches(&Subject::parse("chat.updates").unwrap()));
        assert!(!p.matches(&Subject::parse("chat").unwrap()));
        assert!(!p.matches(&Subject::parse("chat.updates.extra").unwrap()));
    }

    #[test]
    fn test_is_wildcard() {
        assert!(SubjectPattern::parse("*.0xabc.>").unwrap().is_wildcard());
        assert!(SubjectPattern::parse(">").unwrap().is_wildcard());
        assert!(!SubjectPattern::parse("chat.0xabc").unwrap().is_wildcard());
    }

    #[test]
    fn test_literal_exact_match() {
        let p = SubjectPattern::parse("chat.0xabc.outbox").unwrap();

        assert!(p.matches(&Subject::parse("chat.0xabc.outbox").unwrap()));
        assert!(!p.matches(&Subject::parse("chat.0xabc").unwrap()));
        assert!(!p.matches(&Subject::parse("chat.0xabc.outbox.extra").unwrap()));
    }
}
