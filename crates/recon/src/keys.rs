use crate::model::Record;
use crate::normalize::normalize_key;

/// Joins normalized values in the internal matching key.
pub const COMPOSITE_SEPARATOR: &str = "|";

/// Joins non-empty normalized values in the display identifier.
pub const DISPLAY_SEPARATOR: &str = "-";

/// Internal matching key: every key field normalized, in order, pipe-joined.
///
/// Absent fields contribute `""`, so the key is defined for any record.
pub fn composite_key(record: &Record, key_fields: &[String]) -> String {
    key_fields
        .iter()
        .map(|f| normalize_key(record.value(f)))
        .collect::<Vec<_>>()
        .join(COMPOSITE_SEPARATOR)
}

/// Display identifier: non-empty normalized key values, hyphen-joined.
///
/// Not used for matching. Distinct composite keys can share a display key
/// when some key values are blank.
pub fn display_key(record: &Record, key_fields: &[String]) -> String {
    key_fields
        .iter()
        .map(|f| normalize_key(record.value(f)))
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(DISPLAY_SEPARATOR)
}

/// Both derived keys for one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKeys {
    pub composite: String,
    pub display: String,
}

impl RecordKeys {
    pub fn for_record(record: &Record, key_fields: &[String]) -> Self {
        let normalized: Vec<String> = key_fields
            .iter()
            .map(|f| normalize_key(record.value(f)))
            .collect();
        let display = normalized
            .iter()
            .filter(|v| !v.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(DISPLAY_SEPARATOR);
        Self {
            composite: normalized.join(COMPOSITE_SEPARATOR),
            display,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn composite_single_field() {
        let r = Record::from_pairs([("Key", " us ")]);
        assert_eq!(composite_key(&r, &fields(&["Key"])), "US");
    }

    #[test]
    fn composite_keeps_empty_positions() {
        let r = Record::from_pairs([("Country", "de"), ("Region", ""), ("City", "berlin")]);
        assert_eq!(
            composite_key(&r, &fields(&["Country", "Region", "City"])),
            "DE||BERLIN"
        );
    }

    #[test]
    fn composite_absent_field_is_empty() {
        let r = Record::from_pairs([("Country", "de")]);
        assert_eq!(composite_key(&r, &fields(&["Country", "Region"])), "DE|");
        assert_eq!(composite_key(&Record::new(), &fields(&["A", "B"])), "|");
    }

    #[test]
    fn composite_field_order_matters() {
        let r = Record::from_pairs([("A", "x"), ("B", "y")]);
        assert_ne!(
            composite_key(&r, &fields(&["A", "B"])),
            composite_key(&r, &fields(&["B", "A"]))
        );
    }

    #[test]
    fn display_skips_empty_values() {
        let r = Record::from_pairs([("Country", "de"), ("Region", "  "), ("City", "berlin")]);
        assert_eq!(display_key(&r, &fields(&["Country", "Region", "City"])), "DE-BERLIN");
    }

    #[test]
    fn display_empty_cases() {
        let r = Record::from_pairs([("Key", "")]);
        assert_eq!(display_key(&r, &fields(&["Key"])), "");
        assert_eq!(display_key(&r, &[]), "");
    }

    #[test]
    fn display_collision_across_distinct_composites() {
        let k = fields(&["A", "B"]);
        let left = Record::from_pairs([("A", "x"), ("B", "")]);
        let right = Record::from_pairs([("A", ""), ("B", "x")]);
        assert_ne!(composite_key(&left, &k), composite_key(&right, &k));
        assert_eq!(display_key(&left, &k), display_key(&right, &k));
    }

    #[test]
    fn record_keys_agree_with_free_functions() {
        let k = fields(&["Country", "Region"]);
        let r = Record::from_pairs([("Country", " fr"), ("Region", "idf ")]);
        let keys = RecordKeys::for_record(&r, &k);
        assert_eq!(keys.composite, composite_key(&r, &k));
        assert_eq!(keys.display, display_key(&r, &k));
        assert_eq!(keys.display, "FR-IDF");
    }
}
