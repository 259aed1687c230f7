//! Tide times adapter
//!
//! Parses the yearly tide-times document into [`TideEvent`]s and selects the
//! events to show for a station: today's first, otherwise the first events on
//! record for that station.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{TideEvent, TideSelection, TideType};

/// Most events returned for one station
pub const MAX_EVENTS: usize = 3;

/// Typed view of one tide-times document, in feed order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TideTable {
    events: Vec<TideEvent>,
    quarantined: usize,
}

/// Date parts and times come as strings or integers depending on the feed
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawField {
    Int(i64),
    Text(String),
}

impl RawField {
    fn as_int(&self) -> Option<i64> {
        match self {
            RawField::Int(n) => Some(*n),
            RawField::Text(s) => s.trim().parse().ok(),
        }
    }

    fn into_text(self) -> String {
        match self {
            RawField::Int(n) => n.to_string(),
            RawField::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTide {
    place: String,
    #[serde(rename = "eventType")]
    event_type: String,
    #[serde(rename = "eventTime")]
    event_time: RawField,
    year: RawField,
    month: RawField,
    day: RawField,
}

impl RawTide {
    fn into_event(self) -> Option<TideEvent> {
        let year = i32::try_from(self.year.as_int()?).ok()?;
        let month = u32::try_from(self.month.as_int()?).ok()?;
        let day = u32::try_from(self.day.as_int()?).ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let event_type = TideType::parse(&self.event_type)?;
        Some(TideEvent {
            place: self.place,
            event_type,
            time: self.event_time.into_text(),
            date,
        })
    }
}

impl TideTable {
    /// Creates a table from already-typed events
    pub fn new(events: Vec<TideEvent>) -> Self {
        Self {
            events,
            quarantined: 0,
        }
    }

    /// Parses a tide-times document (`{"tide": [...]}`).
    ///
    /// Records with an unknown event type or an impossible date are
    /// quarantined. A missing or non-list `tide` member yields an empty table.
    pub fn from_document(doc: &Value) -> Self {
        let raw = match doc.get("tide") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        };

        let mut quarantined = 0;
        let events = raw
            .iter()
            .filter_map(|record| {
                let event = RawTide::deserialize(record)
                    .ok()
                    .and_then(RawTide::into_event);
                if event.is_none() {
                    debug!(?record, "Quarantined tide record");
                    quarantined += 1;
                }
                event
            })
            .collect::<Vec<_>>();

        debug!(events = events.len(), quarantined, "Parsed tide table");

        Self {
            events,
            quarantined,
        }
    }

    /// Selects up to three events for `station` on `today`.
    ///
    /// The station matches any event whose place text contains it. When at
    /// least one such event falls on `today`, only today's events are
    /// returned; otherwise the first events for the station regardless of
    /// date, with `stale` set. Feed order is kept.
    ///
    /// # Arguments
    /// * `station` - Tide station name, matched as a substring of the place
    /// * `today` - The day to select events for
    ///
    /// # Returns
    /// * A `TideSelection` with at most three events. `events` is empty when
    ///   the table has nothing for the station.
    pub fn events_for(&self, station: &str, today: NaiveDate) -> TideSelection {
        let at_station = || self.events.iter().filter(move |e| e.place.contains(station));

        let todays: Vec<TideEvent> = at_station()
            .filter(|e| e.date == today)
            .take(MAX_EVENTS)
            .cloned()
            .collect();

        if !todays.is_empty() {
            return TideSelection {
                station: station.to_string(),
                events: todays,
                stale: false,
            };
        }

        let fallback: Vec<TideEvent> = at_station().take(MAX_EVENTS).cloned().collect();
        let stale = !fallback.is_empty();
        if stale {
            debug!(station, %today, "No tide events today, using first events on record");
        }

        TideSelection {
            station: station.to_string(),
            events: fallback,
            stale,
        }
    }

    /// All parsed events in feed order
    pub fn events(&self) -> &[TideEvent] {
        &self.events
    }

    /// Number of records skipped because they did not parse
    pub fn quarantined(&self) -> usize {
        self.quarantined
    }

    /// True when the document held no usable events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Tide-times document with string date parts, as served by the feed
    fn sample_doc() -> Value {
        json!({
            "tide": [
                {"place": "大廟灣", "eventType": "Low", "eventTime": "03:10",
                 "year": "2024", "month": "1", "day": "1"},
                {"place": "鰂魚涌", "eventType": "High", "eventTime": "05:20",
                 "year": "2024", "month": "01", "day": "02"},
                {"place": "大廟灣", "eventType": "High", "eventTime": "09:42",
                 "year": "2024", "month": "1", "day": "2"},
                {"place": "大廟灣", "eventType": "Low", "eventTime": "15:05",
                 "year": "2024", "month": "1", "day": "2"},
                {"place": "大廟灣", "eventType": "High", "eventTime": "20:30",
                 "year": "2024", "month": "1", "day": "2"},
                {"place": "大廟灣", "eventType": "Low", "eventTime": "23:55",
                 "year": "2024", "month": "1", "day": "2"},
                {"place": "大廟灣", "eventType": "High", "eventTime": "10:31",
                 "year": 2024, "month": 1, "day": 3}
            ]
        })
    }

    #[test]
    fn test_parse_string_and_integer_date_parts() {
        let table = TideTable::from_document(&sample_doc());
        assert_eq!(table.events().len(), 7);
        assert_eq!(table.quarantined(), 0);
        assert_eq!(table.events()[0].date, date(2024, 1, 1));
        assert_eq!(table.events()[6].date, date(2024, 1, 3));
        assert_eq!(table.events()[6].event_type, TideType::High);
    }

    #[test]
    fn test_today_events_only_and_capped_at_three() {
        let table = TideTable::from_document(&sample_doc());
        let selection = table.events_for("大廟灣", date(2024, 1, 2));

        assert!(!selection.stale);
        assert_eq!(selection.events.len(), MAX_EVENTS);
        assert!(selection.events.iter().all(|e| e.date == date(2024, 1, 2)));
        assert!(selection.events.iter().all(|e| e.place.contains("大廟灣")));
        let times: Vec<&str> = selection.events.iter().map(|e| e.time.as_str()).collect();
        assert_eq!(times, vec!["09:42", "15:05", "20:30"]);
    }

    #[test]
    fn test_single_event_today_is_not_mixed_with_fallback() {
        let table = TideTable::from_document(&sample_doc());
        let selection = table.events_for("大廟灣", date(2024, 1, 3));

        assert!(!selection.stale);
        assert_eq!(selection.events.len(), 1);
        assert_eq!(selection.events[0].time, "10:31");
    }

    #[test]
    fn test_fallback_to_first_events_when_none_today() {
        let table = TideTable::from_document(&sample_doc());
        let selection = table.events_for("大廟灣", date(2024, 6, 1));

        assert!(selection.stale);
        let times: Vec<&str> = selection.events.iter().map(|e| e.time.as_str()).collect();
        assert_eq!(times, vec!["03:10", "09:42", "15:05"]);
    }

    #[test]
    fn test_station_matched_by_substring() {
        let doc = json!({
            "tide": [
                {"place": "大廟灣 (Tai Miu Wan)", "eventType": "High", "eventTime": "01:00",
                 "year": 2024, "month": 1, "day": 1}
            ]
        });
        let table = TideTable::from_document(&doc);
        assert_eq!(table.events_for("大廟灣", date(2024, 1, 1)).events.len(), 1);
        assert!(table.events_for("石壁", date(2024, 1, 1)).events.is_empty());
    }

    #[test]
    fn test_unknown_station_gives_empty_non_stale_selection() {
        let table = TideTable::from_document(&sample_doc());
        let selection = table.events_for("石壁", date(2024, 1, 2));
        assert!(selection.events.is_empty());
        assert!(!selection.stale);
        assert_eq!(selection.station, "石壁");
    }

    #[test]
    fn test_feed_order_is_preserved_not_sorted() {
        let doc = json!({
            "tide": [
                {"place": "青衣", "eventType": "Low", "eventTime": "22:00",
                 "year": 2024, "month": 1, "day": 1},
                {"place": "青衣", "eventType": "High", "eventTime": "04:00",
                 "year": 2024, "month": 1, "day": 1}
            ]
        });
        let table = TideTable::from_document(&doc);
        let selection = table.events_for("青衣", date(2024, 1, 1));
        assert_eq!(selection.events[0].time, "22:00");
        assert_eq!(selection.events[1].time, "04:00");
    }

    #[test]
    fn test_malformed_records_are_quarantined() {
        let doc = json!({
            "tide": [
                {"place": "青衣", "eventType": "Slack", "eventTime": "01:00",
                 "year": 2024, "month": 1, "day": 1},
                {"place": "青衣", "eventType": "High", "eventTime": "01:00",
                 "year": 2024, "month": 2, "day": 30},
                {"place": "青衣", "eventType": "High", "eventTime": "01:00",
                 "year": "two", "month": 1, "day": 1},
                {"eventType": "High", "eventTime": "01:00", "year": 2024, "month": 1, "day": 1},
                {"place": "青衣", "eventType": "Low", "eventTime": 415,
                 "year": 2024, "month": 1, "day": 1}
            ]
        });
        let table = TideTable::from_document(&doc);
        assert_eq!(table.quarantined(), 4);
        assert_eq!(table.events().len(), 1);
        assert_eq!(table.events()[0].time, "415");
    }

    #[test]
    fn test_missing_tide_member_is_empty() {
        assert!(TideTable::from_document(&json!({})).is_empty());
        assert!(TideTable::from_document(&json!({"tide": "none"})).is_empty());
        assert!(TideTable::from_document(&json!(null)).is_empty());
    }

    #[test]
    fn test_never_more_than_three_events() {
        let table = TideTable::from_document(&sample_doc());
        for day in 1..=5 {
            let selection = table.events_for("大廟灣", date(2024, 1, day));
            assert!(selection.events.len() <= MAX_EVENTS);
        }
    }
}
