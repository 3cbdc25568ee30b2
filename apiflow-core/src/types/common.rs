use std::fmt;

pub type AnyValue = serde_json::Value;

/// A scalar tunable stored in the session `config` scope.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl ConfigValue {
    /// Reads a command-line style value: booleans and numbers are recognized, anything else
    /// is kept as a string.
    pub fn parse_lossy(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(b) = trimmed.parse::<bool>() {
            return Self::Bool(b);
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        Self::String(raw.to_string())
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(i) => u64::try_from(*i).ok(),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lossy_recognizes_scalars() {
        assert_eq!(ConfigValue::parse_lossy("true"), ConfigValue::Bool(true));
        assert_eq!(ConfigValue::parse_lossy("1500"), ConfigValue::Integer(1500));
        assert_eq!(ConfigValue::parse_lossy("0.5"), ConfigValue::Float(0.5));
        assert_eq!(
            ConfigValue::parse_lossy("verbose"),
            ConfigValue::String("verbose".to_string())
        );
    }

    #[test]
    fn negative_integers_are_not_durations() {
        assert_eq!(ConfigValue::Integer(-3).as_u64(), None);
        assert_eq!(ConfigValue::Integer(250).as_u64(), Some(250));
    }
}
