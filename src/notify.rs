//! Operator notifications for a spike.
//!
//! Every spike produces the same six milestone messages at fixed offsets.
//! The list is recomputed from the event on demand; delivery scheduling is
//! up to the consumer, `due_messages` just filters by time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::spike::SpikeEvent;

/// Seconds after spike start at which each milestone is announced.
pub const MILESTONE_OFFSETS: [u32; 6] = [0, 2, 5, 7, 10, 13];

/// The milestones of a spike's mitigation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Detected,
    Rising,
    ShuttersClosing,
    Isolated,
    Ventilating,
    Recovered,
}

impl Milestone {
    const ORDER: [Milestone; 6] = [
        Milestone::Detected,
        Milestone::Rising,
        Milestone::ShuttersClosing,
        Milestone::Isolated,
        Milestone::Ventilating,
        Milestone::Recovered,
    ];
}

/// A scheduled message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub offset_secs: u32,
    pub milestone: Milestone,
    pub text: String,
}

/// All six notifications for `event`, in delivery order.
pub fn messages_for(event: &SpikeEvent) -> Vec<Notification> {
    Milestone::ORDER
        .into_iter()
        .zip(MILESTONE_OFFSETS)
        .map(|(milestone, offset_secs)| Notification {
            offset_secs,
            milestone,
            text: milestone_text(milestone, event),
        })
        .collect()
}

/// The notifications whose scheduled time is at or before `now`.
pub fn due_messages(event: &SpikeEvent, now: DateTime<Utc>) -> Vec<Notification> {
    let elapsed = event.elapsed_secs(now);
    if elapsed < 0.0 {
        return Vec::new();
    }
    messages_for(event)
        .into_iter()
        .filter(|n| f64::from(n.offset_secs) <= elapsed)
        .collect()
}

fn milestone_text(milestone: Milestone, event: &SpikeEvent) -> String {
    let gas = event.gas();
    let room = event.location();
    match milestone {
        Milestone::Detected => format!("{gas} levels elevated in {room}. Monitoring..."),
        Milestone::Rising => {
            format!("{gas} rising. Investigate source and increase ventilation.")
        }
        Milestone::ShuttersClosing => {
            format!("Alarm threshold reached. Closing shutters to isolate {room}.")
        }
        Milestone::Isolated => format!("{room} isolated. Production areas remain safe."),
        Milestone::Ventilating => format!("Ventilation engaged. {gas} dissipating."),
        Milestone::Recovered => format!("{room} returned to safe condition."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GasKind;
    use crate::spike::SpikeTimeline;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn event(location: &str, gas: GasKind) -> SpikeEvent {
        SpikeEvent::new(location, gas, at(100), SpikeTimeline::default()).unwrap()
    }

    #[test]
    fn test_six_messages_at_fixed_offsets() {
        for (location, gas) in [
            ("Room 3", GasKind::O2),
            ("Room 12", GasKind::Ethanol),
            ("Production 2", GasKind::H2S),
        ] {
            let messages = messages_for(&event(location, gas));
            assert_eq!(messages.len(), 6);
            let offsets: Vec<u32> = messages.iter().map(|n| n.offset_secs).collect();
            assert_eq!(offsets, vec![0, 2, 5, 7, 10, 13]);
            assert_eq!(messages[0].milestone, Milestone::Detected);
            assert_eq!(messages[5].milestone, Milestone::Recovered);
        }
    }

    #[test]
    fn test_text_mentions_gas_and_room() {
        let messages = messages_for(&event("Room 1", GasKind::NH3));
        assert_eq!(messages[0].text, "NH3 levels elevated in Room 1. Monitoring...");
        assert!(messages[2].text.contains("Closing shutters to isolate Room 1"));
        assert!(messages[4].text.contains("NH3 dissipating"));
        assert_eq!(messages[5].text, "Room 1 returned to safe condition.");
    }

    #[test]
    fn test_messages_are_idempotent() {
        let spike = event("Room 3", GasKind::O2);
        assert_eq!(messages_for(&spike), messages_for(&spike));
    }

    #[test]
    fn test_due_messages_filter_by_time() {
        let spike = event("Room 3", GasKind::O2);
        assert!(due_messages(&spike, at(99)).is_empty());
        assert_eq!(due_messages(&spike, at(100)).len(), 1);
        assert_eq!(due_messages(&spike, at(104)).len(), 2);
        assert_eq!(due_messages(&spike, at(105)).len(), 3);
        assert_eq!(due_messages(&spike, at(110)).len(), 5);
        assert_eq!(due_messages(&spike, at(113)).len(), 6);
        assert_eq!(due_messages(&spike, at(500)).len(), 6);
    }
}
