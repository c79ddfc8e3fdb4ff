use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A user id as seen by the remote API.
///
/// The feed and relation endpoints emit `mid` as a JSON number, while the
/// session cookie carries it as a string. Both normalize to the decimal
/// string form, so `123` and `"123"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Read an identity out of an arbitrary JSON value. Anything other than a
    /// non-empty string or a number yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::new(s.as_str()),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Identity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Identity::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom("expected a non-empty string or number identity"))
    }
}

/// Follow-group id (`tagid` on the relation API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

impl GroupId {
    /// Sentinel the tab bar uses for "show everything".
    pub const ALL_CONTENT: GroupId = GroupId(-1);
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the user picked in the group tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSelection {
    AllContent,
    Group(GroupId),
}

impl From<GroupId> for GroupSelection {
    fn from(id: GroupId) -> Self {
        if id == GroupId::ALL_CONTENT {
            GroupSelection::AllContent
        } else {
            GroupSelection::Group(id)
        }
    }
}

impl std::str::FromStr for GroupSelection {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(GroupSelection::AllContent);
        }
        s.parse::<i64>()
            .map(|id| GroupSelection::from(GroupId(id)))
            .map_err(|_| crate::Error::Validation(format!("invalid group id: {}", s)))
    }
}

/// One entry of the user's follow-group list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub tagid: GroupId,
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_number_and_string_compare_equal() {
        let a = Identity::from_json(&json!(12345)).unwrap();
        let b = Identity::from_json(&json!("12345")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_identity_rejects_empty_and_null() {
        assert!(Identity::from_json(&json!("")).is_none());
        assert!(Identity::from_json(&json!(null)).is_none());
        assert!(Identity::from_json(&json!({"mid": 1})).is_none());
        assert!(Identity::new("   ").is_none());
    }

    #[test]
    fn test_identity_deserialize() {
        let ids: Vec<Identity> = serde_json::from_str(r#"[1, "2", 30]"#).unwrap();
        assert_eq!(ids.iter().map(|i| i.as_str()).collect::<Vec<_>>(), vec!["1", "2", "30"]);
        assert!(serde_json::from_str::<Identity>("true").is_err());
    }

    #[test]
    fn test_group_selection_parse() {
        assert_eq!("all".parse::<GroupSelection>().unwrap(), GroupSelection::AllContent);
        assert_eq!("-1".parse::<GroupSelection>().unwrap(), GroupSelection::AllContent);
        assert_eq!("-10".parse::<GroupSelection>().unwrap(), GroupSelection::Group(GroupId(-10)));
        assert_eq!("42".parse::<GroupSelection>().unwrap(), GroupSelection::Group(GroupId(42)));
        assert!("abc".parse::<GroupSelection>().is_err());
    }

    #[test]
    fn test_group_deserialize_from_api_shape() {
        let g: Group = serde_json::from_value(json!({"tagid": -10, "name": "特别关注", "count": 3, "tip": ""})).unwrap();
        assert_eq!(g.tagid, GroupId(-10));
        assert_eq!(g.count, 3);
    }
}
