//! TTL (de)serialization helpers
//!
//! - serialize: `Duration` -> whole seconds
//! - deserialize: whole seconds or a numeric string (e.g. `"3600"`) -> `Duration`

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serializes a `Duration` as whole seconds (sub-second part is dropped).
pub fn serialize<S>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(ttl.as_secs())
}

/// Accepts whole seconds or a numeric string.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        U64(u64),
        String(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::U64(secs) => Ok(Duration::from_secs(secs)),
        Seconds::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| Error::custom(format!("Invalid TTL '{s}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(with = "super")]
        ttl: Duration,
    }

    #[test]
    fn serializes_whole_seconds() {
        let h = Holder {
            ttl: Duration::from_millis(3_600_900),
        };
        let res = serde_json::to_string(&h);
        assert!(res.is_ok(), "serialize failed: {res:?}");
        let Ok(json) = res else { return };
        assert_eq!(json, r#"{"ttl":3600}"#);
    }

    #[test]
    fn deserializes_number_and_string() {
        let a = serde_json::from_str::<Holder>(r#"{"ttl":300}"#);
        let b = serde_json::from_str::<Holder>(r#"{"ttl":"300"}"#);
        assert!(a.is_ok() && b.is_ok(), "deserialize failed: {a:?} {b:?}");
        let (Ok(a), Ok(b)) = (a, b) else { return };
        assert_eq!(a.ttl, Duration::from_secs(300));
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_garbage() {
        let res: serde_json::Result<Holder> = serde_json::from_str(r#"{"ttl":"soon"}"#);
        assert!(res.is_err());
    }
}
