use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use uuid::Uuid;

pub type Id = String;

/// Generate a document id. Ids are time-ordered, so sorting by id sorts by
/// creation order.
pub fn generate_id() -> Id {
    Uuid::now_v7().to_string()
}

/// Generate an id for an embedded sub-document (e.g. a reply).
pub fn generate_sub_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Render a timestamp for clients, e.g. `Jun 1st, 2021 at 3:05 pm`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    format!(
        "{} {}{}, {} at {}",
        timestamp.format("%b"),
        timestamp.day(),
        ordinal_suffix(timestamp.day()),
        timestamp.year(),
        timestamp.format("%-I:%M %P"),
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

pub fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(timestamp))
}

/// Request field that tells "absent" (`None`) apart from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default, deserialize_with = "present")]`.
pub type Field<T> = Option<Option<T>>;

pub fn present<'de, D, T>(deserializer: D) -> Result<Field<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2021, 6, 1, 15, 5, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "Jun 1st, 2021 at 3:05 pm");

        let ts = Utc.with_ymd_and_hms(2022, 12, 12, 0, 30, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "Dec 12th, 2022 at 12:30 am");
    }

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(31), "st");
    }

    #[test]
    fn test_generated_ids_sort_by_creation() {
        let first = generate_id();
        let second = generate_id();
        assert!(first < second);
    }
}
