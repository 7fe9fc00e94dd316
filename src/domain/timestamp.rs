use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub fn format_rfc3339(value: OffsetDateTime) -> Option<String> {
    value.to_offset(UtcOffset::UTC).format(&Rfc3339).ok()
}

/// Parses store timestamps: RFC 3339, a zone-less `timestamp` column
/// (read as UTC), or a bare calendar date (midnight UTC).
pub fn parse_lenient(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    if raw.len() > 10 {
        let zoned = format!("{}Z", raw.replacen(' ', "T", 1));
        if let Ok(parsed) = OffsetDateTime::parse(&zoned, &Rfc3339) {
            return Some(parsed);
        }
    }
    parse_date(raw).map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// `dd/mm/yyyy`, used on list rows.
pub fn format_day(value: OffsetDateTime) -> String {
    value
        .to_offset(UtcOffset::UTC)
        .format(format_description!("[day]/[month]/[year]"))
        .unwrap_or_default()
}

/// `dd/mm/yyyy hh:mm`, used on detail views.
pub fn format_full(value: OffsetDateTime) -> String {
    value
        .to_offset(UtcOffset::UTC)
        .format(format_description!("[day]/[month]/[year] [hour]:[minute]"))
        .unwrap_or_default()
}

/// `dd Mon`, used on note cards.
pub fn format_short(value: OffsetDateTime) -> String {
    value
        .to_offset(UtcOffset::UTC)
        .format(format_description!("[day] [month repr:short]"))
        .unwrap_or_default()
}

/// Serde adapter for optional timestamp columns. Unparseable values read as
/// absent instead of failing the whole row.
pub mod opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use time::OffsetDateTime;

    pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => match super::format_rfc3339(*value) {
                Some(text) => serializer.serialize_str(&text),
                None => Err(serde::ser::Error::custom("timestamp out of RFC 3339 range")),
            },
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(Value::as_str)
            .and_then(super::parse_lenient))
    }
}

#[cfg(test)]
mod tests {
    use super::{format_day, format_rfc3339, format_short, parse_date, parse_lenient};
    use time::macros::{date, datetime};

    #[test]
    fn parses_rfc3339_naive_and_date_only_values() {
        assert_eq!(
            parse_lenient("2026-05-01T10:30:00+02:00"),
            Some(datetime!(2026-05-01 08:30:00 UTC))
        );
        assert_eq!(
            parse_lenient("2026-05-01T10:30:00.123"),
            Some(datetime!(2026-05-01 10:30:00.123 UTC))
        );
        assert_eq!(
            parse_lenient("2026-05-01 10:30:00"),
            Some(datetime!(2026-05-01 10:30:00 UTC))
        );
        assert_eq!(
            parse_lenient("2026-05-01"),
            Some(datetime!(2026-05-01 00:00:00 UTC))
        );
        assert_eq!(parse_lenient("Invalid Date"), None);
        assert_eq!(parse_lenient(""), None);
    }

    #[test]
    fn formats_list_and_note_dates() {
        let value = datetime!(2026-03-07 18:05:00 UTC);
        assert_eq!(format_day(value), "07/03/2026");
        assert_eq!(format_short(value), "07 Mar");
        assert_eq!(
            format_rfc3339(value).as_deref(),
            Some("2026-03-07T18:05:00Z")
        );
        assert_eq!(parse_date("2026-12-31"), Some(date!(2026 - 12 - 31)));
    }
}
