use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Strongly typed identifier of a persisted API descriptor, backed by ULID.
///
/// The repository assigns one on `save`; ULIDs sort by creation time, which keeps
/// listings in insertion order without a separate sequence.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ApiId(pub ulid::Ulid);

impl ApiId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn from_ulid(id: ulid::Ulid) -> Self {
        Self(id)
    }
}

impl Default for ApiId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ApiId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = ulid::Ulid::from_string(s)?;
        Ok(ApiId(id))
    }
}

impl Serialize for ApiId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ApiId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<ApiId>()
            .map_err(|_| serde::de::Error::custom("invalid api id"))
    }
}

#[cfg(test)]
mod tests {
    use super::ApiId;

    #[test]
    fn test_display_parse_roundtrip() {
        let id = ApiId::new();
        let parsed: ApiId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("not-a-ulid".parse::<ApiId>().is_err());
        assert!(serde_json::from_str::<ApiId>("\"nope\"").is_err());
    }
}
