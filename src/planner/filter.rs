use crate::planner::CalendarRecord;

/// Keeps records whose searchable fields contain `query`, ignoring case.
///
/// An empty query keeps everything, in input order. Whitespace is matched
/// like any other character.
pub fn filter<'a>(records: &'a [CalendarRecord], query: &str) -> Vec<&'a CalendarRecord> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| record.matches(&needle))
        .collect()
}

impl CalendarRecord {
    /// `needle` must already be lower-cased, like the fields.
    fn matches(&self, needle: &str) -> bool {
        self.searchable_fields
            .iter()
            .any(|field| field.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::RecordKind;

    fn record(id: &str, fields: &[&str]) -> CalendarRecord {
        CalendarRecord {
            id: id.to_string(),
            kind: RecordKind::Event,
            title: id.to_string(),
            anchor_time: None,
            interval_start: None,
            interval_end: None,
            searchable_fields: fields.iter().map(|f| f.to_string()).collect(),
            status: String::new(),
        }
    }

    #[test]
    fn empty_query_is_identity() {
        let records = vec![
            record("a", &["alpha"]),
            record("b", &[]),
            record("c", &["gamma"]),
        ];
        let kept = filter(&records, "");
        assert_eq!(kept.len(), 3);
        for (kept, original) in kept.iter().zip(&records) {
            assert_eq!(*kept, original);
        }
    }

    #[test]
    fn whitespace_is_part_of_the_query() {
        let records = vec![record("a", &["nospace"]), record("b", &["edsa north"])];
        let ids: Vec<_> = filter(&records, " ").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        let ids: Vec<_> = filter(&records, "a n").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        assert!(filter(&records, " nospace").is_empty());
    }

    #[test]
    fn matches_any_field_case_insensitively() {
        let records = vec![
            record("a", &["edsa north", "acme"]),
            record("b", &["makati", "dana cruz"]),
            record("c", &["ortigas"]),
        ];
        let ids: Vec<_> = filter(&records, "ACME").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        let ids: Vec<_> = filter(&records, "Cruz").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        let ids: Vec<_> = filter(&records, "a").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn unmatched_query_keeps_nothing() {
        let records = vec![record("a", &["alpha"])];
        assert!(filter(&records, "zeta").is_empty());
    }
}
