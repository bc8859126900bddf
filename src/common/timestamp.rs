// src/common/timestamp.rs

// Datas dos documentos em RFC 3339 com nanossegundos fixos, para que a
// ordem do texto seja a ordem do tempo. Uso: #[serde(with = "timestamp")]

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

// Aceita qualquer precisão, inclusive documentos gravados antes
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "crate::common::timestamp")]
        at: DateTime<Utc>,
    }

    fn text(at: DateTime<Utc>) -> String {
        serde_json::to_value(Stamped { at }).unwrap()["at"].as_str().unwrap().to_string()
    }

    #[test]
    fn text_order_follows_time_order() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 5).unwrap();
        let earlier = base + Duration::milliseconds(123);
        let later = base + Duration::nanoseconds(123_456_789);

        assert_eq!(text(earlier), "2024-01-01T00:00:05.123000000Z");
        assert_eq!(text(base), "2024-01-01T00:00:05.000000000Z");
        assert!(text(earlier) < text(later));
        assert!(text(base) < text(earlier));
    }

    #[test]
    fn reads_any_precision() {
        let back: Stamped = serde_json::from_str(r#"{"at":"2024-01-01T00:00:05.123Z"}"#).unwrap();
        assert_eq!(text(back.at), "2024-01-01T00:00:05.123000000Z");
    }
}
