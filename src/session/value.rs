//! Values stored in a session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar held under a session key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl SessionValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SessionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SessionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SessionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            SessionValue::Float(f) => Some(*f),
            SessionValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for SessionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionValue::Bool(b) => write!(f, "{b}"),
            SessionValue::Int(i) => write!(f, "{i}"),
            SessionValue::Float(x) => write!(f, "{x}"),
            SessionValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for SessionValue {
    fn from(b: bool) -> Self {
        SessionValue::Bool(b)
    }
}

impl From<i64> for SessionValue {
    fn from(i: i64) -> Self {
        SessionValue::Int(i)
    }
}

impl From<i32> for SessionValue {
    fn from(i: i32) -> Self {
        SessionValue::Int(i64::from(i))
    }
}

impl From<u32> for SessionValue {
    fn from(i: u32) -> Self {
        SessionValue::Int(i64::from(i))
    }
}

impl From<f64> for SessionValue {
    fn from(f: f64) -> Self {
        SessionValue::Float(f)
    }
}

impl From<String> for SessionValue {
    fn from(s: String) -> Self {
        SessionValue::Str(s)
    }
}

impl From<&str> for SessionValue {
    fn from(s: &str) -> Self {
        SessionValue::Str(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_are_exact() {
        let v = SessionValue::from(7i64);
        assert_eq!(v.as_int(), Some(7));
        assert_eq!(v.as_str(), None);
        assert_eq!(v.as_float(), Some(7.0));

        let v = SessionValue::from("abc");
        assert_eq!(v.as_str(), Some("abc"));
        assert_eq!(v.as_bool(), None);
    }

    #[test]
    fn test_untagged_json_shape() {
        let values = vec![
            SessionValue::from(true),
            SessionValue::from(3i64),
            SessionValue::from(1.5),
            SessionValue::from("x"),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[true,3,1.5,"x"]"#);

        let back: Vec<SessionValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}
