use super::error::FilterError;
use super::value::Value;
use crate::schema::FieldType;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Convert a raw filter value into a value of the target type
pub fn coerce(target: &FieldType, raw: &str) -> Result<Value, FilterError> {
    coerce_inner(target, raw).ok_or_else(|| {
        FilterError::invalid(format!(
            "Cannot convert value '{}' to type {}",
            raw, target
        ))
    })
}

fn coerce_inner(target: &FieldType, raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    match target {
        FieldType::String => Some(Value::String(raw.to_string())),
        FieldType::Enum(enum_type) => {
            let ordinal = enum_type.lookup(trimmed).or_else(|| {
                trimmed
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n < enum_type.variants.len())
            })?;
            Some(Value::Enum {
                symbol: enum_type.variants[ordinal].clone(),
                ordinal,
            })
        }
        FieldType::Nullable(inner) => coerce_inner(inner, raw),
        FieldType::Int => trimmed.parse().ok().map(Value::Int),
        FieldType::Float => trimmed
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .map(Value::Float),
        FieldType::Bool => {
            if trimmed.eq_ignore_ascii_case("true") {
                Some(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        FieldType::DateTime => parse_datetime(trimmed).map(Value::DateTime),
        FieldType::Date => parse_date(trimmed).map(Value::Date),
        FieldType::List(_) | FieldType::Object(_) => None,
    }
}

/// RFC 3339, a naive timestamp taken as UTC, or a bare date at midnight UTC
pub(crate) fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    parse_date(s)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EnumType;
    use chrono::TimeZone;

    #[test]
    fn test_string_is_returned_unchanged() {
        assert_eq!(
            coerce(&FieldType::String, " padded ").unwrap(),
            Value::String(" padded ".to_string())
        );
    }

    #[test]
    fn test_enum_symbol_lookup() {
        let ty = FieldType::Enum(EnumType::new("Status", ["Active", "Retired"]));
        assert_eq!(
            coerce(&ty, "ACTIVE").unwrap(),
            Value::Enum {
                symbol: "Active".to_string(),
                ordinal: 0
            }
        );
        let err = coerce(&ty, "Archived").unwrap_err();
        assert_eq!(
            err,
            FilterError::invalid("Cannot convert value 'Archived' to type Status")
        );
    }

    #[test]
    fn test_nullable_unwraps() {
        let ty = FieldType::nullable(FieldType::Int);
        assert_eq!(coerce(&ty, "42").unwrap(), Value::Int(42));
        assert!(coerce(&ty, "null").is_err());
    }

    #[test]
    fn test_primitives() {
        assert_eq!(coerce(&FieldType::Float, "2.5").unwrap(), Value::Float(2.5));
        assert_eq!(coerce(&FieldType::Bool, "True").unwrap(), Value::Bool(true));
        assert!(coerce(&FieldType::Int, "ten").is_err());
        assert!(coerce(&FieldType::Int, "2.5").is_err());
        assert!(coerce(&FieldType::Float, "NaN").is_err());
        assert!(coerce(&FieldType::Bool, "yes").is_err());
    }

    #[test]
    fn test_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            coerce(&FieldType::DateTime, "2024-03-01T12:30:00Z").unwrap(),
            Value::DateTime(expected)
        );
        assert_eq!(
            coerce(&FieldType::DateTime, "2024-03-01T14:30:00+02:00").unwrap(),
            Value::DateTime(expected)
        );
        assert_eq!(
            coerce(&FieldType::DateTime, "2024-03-01 12:30:00").unwrap(),
            Value::DateTime(expected)
        );
        assert_eq!(
            coerce(&FieldType::DateTime, "2024-03-01").unwrap(),
            Value::DateTime(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
        assert!(coerce(&FieldType::Date, "03/01/2024").is_err());
    }

    #[test]
    fn test_collection_target_rejected() {
        let err = coerce(&FieldType::list(FieldType::String), "a").unwrap_err();
        assert_eq!(
            err,
            FilterError::invalid("Cannot convert value 'a' to type list<string>")
        );
    }
}
