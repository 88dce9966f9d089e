use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// UTC instant at microsecond precision.
///
/// The canonical text form is RFC 3339 with exactly six fractional digits and
/// a `Z` suffix, e.g. `2024-05-01T09:30:00.123456Z`. Block digests are taken
/// over this form, so a timestamp must survive a text round-trip unchanged;
/// every constructor truncates to microseconds for that reason.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Wrap a `DateTime<Utc>`, dropping sub-microsecond precision.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(6))
    }

    /// Parse an RFC 3339 string. Offsets other than `Z` are converted to UTC.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self::from_utc(dt.with_timezone(&Utc)))
            .map_err(|e| TypeError::InvalidTimestamp {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// Parse a string that is already in canonical form.
    ///
    /// Anything [`Timestamp::parse`] would have to normalize (an offset other
    /// than `Z`, more or fewer than six fractional digits) is rejected, so the
    /// parsed value always writes back byte-identical.
    pub fn parse_canonical(s: &str) -> Result<Self, TypeError> {
        let ts = Self::parse(s)?;
        if ts.to_canonical() != s {
            return Err(TypeError::InvalidTimestamp {
                input: s.to_string(),
                reason: "not in canonical form (YYYY-MM-DDTHH:MM:SS.ffffffZ)".into(),
            });
        }
        Ok(ts)
    }

    /// Canonical RFC 3339 form used for hashing and persistence.
    pub fn to_canonical(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Calendar day of this instant in UTC.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

impl FromStr for Timestamp {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_canonical())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_canonical(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn canonical_form_has_micros_and_z() {
        let ts = Timestamp::parse("2024-05-01T09:30:00Z").unwrap();
        assert_eq!(ts.to_canonical(), "2024-05-01T09:30:00.000000Z");
    }

    #[test]
    fn truncates_nanoseconds() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let ts = Timestamp::from_utc(dt);
        assert_eq!(ts.to_canonical(), "2024-05-01T09:30:00.123456Z");
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let ts = Timestamp::parse("2024-05-01T23:30:00-02:00").unwrap();
        assert_eq!(ts.to_canonical(), "2024-05-02T01:30:00.000000Z");
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn date_ignores_time_of_day() {
        let morning = Timestamp::parse("2024-05-01T00:00:01Z").unwrap();
        let night = Timestamp::parse("2024-05-01T23:59:59.999999Z").unwrap();
        assert_eq!(morning.date(), night.date());
    }

    #[test]
    fn rejects_malformed_input() {
        let err = Timestamp::parse("2024-05-01").unwrap_err();
        assert!(matches!(err, TypeError::InvalidTimestamp { .. }));
    }

    #[test]
    fn now_is_after_2020() {
        let ts = Timestamp::now();
        assert!(ts.date() > NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[test]
    fn parse_canonical_rejects_lossy_forms() {
        assert!(Timestamp::parse_canonical("2024-05-01T09:30:00.123456Z").is_ok());
        for input in [
            "2024-05-01T09:30:00.123456999Z",
            "2024-05-01T09:30:00Z",
            "2024-05-01T09:30:00.123456+00:00",
            "2024-05-01T11:30:00.123456+02:00",
        ] {
            assert!(Timestamp::parse_canonical(input).is_err(), "{input}");
        }
    }

    #[test]
    fn deserialization_is_strict() {
        let extra_digits = "\"2024-05-01T09:30:00.123456999Z\"";
        assert!(serde_json::from_str::<Timestamp>(extra_digits).is_err());
        let offset = "\"2024-05-01T11:30:00.000000+02:00\"";
        assert!(serde_json::from_str::<Timestamp>(offset).is_err());
    }

    #[test]
    fn text_roundtrip_is_exact() {
        let ts = Timestamp::now();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
        assert_eq!(ts.to_canonical(), parsed.to_canonical());
    }
}
