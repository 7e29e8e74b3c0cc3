//! Picks the one message a tick may answer.
//!
//! Only messages dated today (gateway-local date) are considered, so a bot
//! coming back from downtime never replays yesterday's backlog. Among those,
//! the most recent `received` record wins; our own outgoing traffic is skipped.

use chrono::NaiveDate;

use crate::gateway::Message;

/// Most recent received message dated `today`, if any.
///
/// Ordering is by timestamp (ISO-8601, so lexical order is chronological).
/// The sort is stable: equal timestamps keep retrieval order, and the later
/// one in retrieval order counts as more recent.
pub fn select_candidate(messages: &[Message], today: NaiveDate) -> Option<&Message> {
    let mut todays: Vec<&Message> = messages
        .iter()
        .filter(|m| m.date() == Some(today))
        .collect();
    if todays.is_empty() {
        return None;
    }

    todays.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    todays.into_iter().rev().find(|m| m.is_received())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Direction;

    fn msg(id: &str, ts: &str, direction: Direction) -> Message {
        Message {
            id: id.into(),
            timestamp: ts.to_string(),
            direction,
            origin: "N0CALL".to_string(),
            body: "hello".to_string(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn empty_input_has_no_candidate() {
        assert!(select_candidate(&[], day()).is_none());
    }

    #[test]
    fn unordered_input_is_sorted_before_picking() {
        let messages = vec![
            msg("late", "2024-01-01T18:00:00", Direction::Received),
            msg("early", "2024-01-01T06:00:00", Direction::Received),
        ];
        assert_eq!(select_candidate(&messages, day()).unwrap().id.as_str(), "late");
    }

    #[test]
    fn tie_keeps_retrieval_order() {
        let messages = vec![
            msg("first", "2024-01-01T10:00:00", Direction::Received),
            msg("second", "2024-01-01T10:00:00", Direction::Received),
        ];
        assert_eq!(select_candidate(&messages, day()).unwrap().id.as_str(), "second");
    }

    #[test]
    fn unknown_direction_is_never_selected() {
        let messages = vec![msg("odd", "2024-01-01T10:00:00", Direction::Unknown)];
        assert!(select_candidate(&messages, day()).is_none());
    }

    #[test]
    fn undated_timestamps_are_ignored() {
        let messages = vec![msg("bad", "sometime", Direction::Received)];
        assert!(select_candidate(&messages, day()).is_none());
    }
}
