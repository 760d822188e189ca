use chrono::{DateTime, NaiveDateTime, Utc};

/*-------------------------------------------------------------------------------------------------
  DateTime Format
-------------------------------------------------------------------------------------------------*/

const AWS_IP_RANGES_DATETIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Parse an AWS IP Ranges `createDate` value (`YYYY-MM-DD-hh-mm-ss`, UTC).
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, AWS_IP_RANGES_DATETIME_FORMAT)
        .map(|naive_date_time| naive_date_time.and_utc())
        .inspect_err(|error| log::debug!("Unparsable createDate `{value}`: {error}"))
        .ok()
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_log::test;

    #[test]
    fn test_parse_create_date() {
        let expected = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse("2022-01-01-00-00-00"), Some(expected));
    }

    #[test]
    fn test_parse_invalid_create_date() {
        assert_eq!(parse("2022-01-01T00:00:00Z"), None);
        assert_eq!(parse(""), None);
    }
}
