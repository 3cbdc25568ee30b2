use std::fmt;

pub const RESERVED_SCOPES: [&str; 4] = ["env", "input", "runtime", "config"];

/// The partition of session state a token reads from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Env,
    Input,
    Runtime,
    Config,
    /// Any non-reserved prefix names a step whose recorded result is read.
    Step(String),
}

impl Scope {
    fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "env" => Self::Env,
            "input" => Self::Input,
            "runtime" => Self::Runtime,
            "config" => Self::Config,
            other => Self::Step(other.to_string()),
        }
    }

    pub fn step_id(&self) -> Option<&str> {
        match self {
            Self::Step(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env => f.write_str("env"),
            Self::Input => f.write_str("input"),
            Self::Runtime => f.write_str("runtime"),
            Self::Config => f.write_str("config"),
            Self::Step(id) => f.write_str(id),
        }
    }
}

/// One `{{scope.path}}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The exact source text including braces, restored verbatim when resolution fails.
    pub raw: String,
    pub scope: Scope,
    /// Field or index accessors after the scope; never empty.
    pub path: Vec<String>,
}

impl Token {
    /// Parses the text between `{{` and `}}`. `raw` is the full source text of the token.
    pub fn parse(inner: &str, raw: &str) -> Result<Self, TokenError> {
        let inner = inner.trim();
        if inner.is_empty() {
            return Err(TokenError::Empty);
        }

        let segments = split_segments(inner)?;
        let Some((prefix, path)) = segments.split_first() else {
            return Err(TokenError::Empty);
        };
        if !is_scope_name(prefix) {
            return Err(TokenError::InvalidScope(prefix.clone()));
        }
        if path.is_empty() {
            return Err(TokenError::MissingPath(prefix.clone()));
        }

        Ok(Self {
            raw: raw.to_string(),
            scope: Scope::from_prefix(prefix),
            path: path.to_vec(),
        })
    }

    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("empty interpolation token")]
    Empty,
    #[error("invalid scope name `{0}`")]
    InvalidScope(String),
    #[error("token `{0}` has no path after its scope")]
    MissingPath(String),
    #[error("empty path segment in `{0}`")]
    EmptySegment(String),
    #[error("invalid index accessor in `{0}`")]
    InvalidIndex(String),
    #[error("invalid character `{ch}` in `{token}`")]
    InvalidCharacter { token: String, ch: char },
}

/// Scope names share the step id grammar so any valid step id can be a prefix.
fn is_scope_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Splits `a.b[0].c` into `["a", "b", "0", "c"]`.
fn split_segments(inner: &str) -> Result<Vec<String>, TokenError> {
    let mut out = Vec::new();
    let mut current = String::new();
    // Set right after `]`: the next char must be `.`, `[` or the end.
    let mut after_index = false;
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if current.is_empty() && !after_index {
                    return Err(TokenError::EmptySegment(inner.to_string()));
                }
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                after_index = false;
            }
            '[' => {
                if current.is_empty() && !after_index {
                    return Err(TokenError::InvalidIndex(inner.to_string()));
                }
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                let mut index = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    index.push(c);
                }
                let index = index.trim();
                if !closed || index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
                    return Err(TokenError::InvalidIndex(inner.to_string()));
                }
                out.push(index.to_string());
                after_index = true;
            }
            c if c.is_whitespace() || matches!(c, '{' | '}' | ']') => {
                return Err(TokenError::InvalidCharacter {
                    token: inner.to_string(),
                    ch: c,
                });
            }
            c => {
                if after_index {
                    return Err(TokenError::InvalidIndex(inner.to_string()));
                }
                current.push(c);
            }
        }
    }

    if !current.is_empty() {
        out.push(current);
    } else if !after_index {
        return Err(TokenError::EmptySegment(inner.to_string()));
    }
    Ok(out)
}
