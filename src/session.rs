//! The single active-spike slot.
//!
//! At most one spike is tracked at a time. Starting a new one replaces the
//! old one outright; there is no queue and no merge. The slot holds a whole
//! immutable `SpikeEvent`, so concurrent writers can only ever swap complete
//! values.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::HazardResult;
use crate::model::GasKind;
use crate::spike::{SpikeEvent, SpikeTimeline};

/// Shared handle to the active-spike slot. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct SpikeRegister {
    slot: Arc<RwLock<Option<SpikeEvent>>>,
}

impl SpikeRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a spike starting at `now` and make it the active one.
    pub async fn start(
        &self,
        location: &str,
        gas: GasKind,
        timeline: SpikeTimeline,
        now: DateTime<Utc>,
    ) -> HazardResult<SpikeEvent> {
        let event = SpikeEvent::new(location, gas, now, timeline)?;
        self.set_active(event.clone()).await;
        Ok(event)
    }

    /// Replace the active spike unconditionally. Returns the superseded one.
    pub async fn set_active(&self, event: SpikeEvent) -> Option<SpikeEvent> {
        let mut slot = self.slot.write().await;
        let previous = slot.replace(event);
        if let (Some(old), Some(new)) = (&previous, &*slot) {
            info!(
                old_location = %old.location(),
                old_gas = %old.gas(),
                location = %new.location(),
                gas = %new.gas(),
                "Active spike superseded"
            );
        }
        previous
    }

    /// The active spike, if any.
    pub async fn active(&self) -> Option<SpikeEvent> {
        self.slot.read().await.clone()
    }

    /// Drop the active spike once it has run past its duration.
    ///
    /// Returns the cleared event. A spike that has not started yet is kept.
    pub async fn clear_if_expired(&self, now: DateTime<Utc>) -> Option<SpikeEvent> {
        let mut slot = self.slot.write().await;
        let expired = matches!(&*slot, Some(event) if event.is_expired(now));
        if !expired {
            return None;
        }

        let cleared = slot.take();
        if let Some(event) = &cleared {
            debug!(
                location = %event.location(),
                gas = %event.gas(),
                "Expired spike cleared"
            );
        }
        cleared
    }

    /// Drop the active spike regardless of its state.
    pub async fn clear(&self) -> Option<SpikeEvent> {
        self.slot.write().await.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tokio_test::{assert_err, assert_ok};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_empty_register() {
        let register = SpikeRegister::new();
        assert!(register.active().await.is_none());
        assert!(register.clear_if_expired(at(1_000)).await.is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let register = SpikeRegister::new();
        let first = assert_ok!(
            register
                .start("Room 1", GasKind::NH3, SpikeTimeline::default(), at(100))
                .await
        );
        let second = SpikeEvent::new("Room 2", GasKind::CO, at(103), SpikeTimeline::default())
            .unwrap();

        let superseded = register.set_active(second.clone()).await;
        assert_eq!(superseded, Some(first.clone()));
        assert_eq!(register.active().await, Some(second));

        // the old event still answers queries through a stale reference
        assert!(first.phase_at(at(104)).is_active());
    }

    #[tokio::test]
    async fn test_clear_if_expired() {
        let register = SpikeRegister::new();
        assert_ok!(
            register
                .start("Room 3", GasKind::O2, SpikeTimeline::default(), at(100))
                .await
        );

        assert!(register.clear_if_expired(at(99)).await.is_none());
        assert!(register.clear_if_expired(at(110)).await.is_none());
        assert!(register.clear_if_expired(at(114)).await.is_none());
        assert!(register.active().await.is_some());

        let cleared = register.clear_if_expired(at(115)).await;
        assert_eq!(cleared.map(|e| e.location().to_string()), Some("Room 3".into()));
        assert!(register.active().await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_the_slot() {
        let register = SpikeRegister::new();
        let handle = register.clone();
        assert_ok!(
            handle
                .start("Room 12", GasKind::Ethanol, SpikeTimeline::default(), at(0))
                .await
        );
        assert!(register.active().await.is_some());
        assert!(register.clear().await.is_some());
        assert!(handle.active().await.is_none());
    }

    #[tokio::test]
    async fn test_start_rejects_bad_timeline() {
        let register = SpikeRegister::new();
        let timeline = SpikeTimeline {
            fade_after: 20.0,
            ..SpikeTimeline::default()
        };
        assert_err!(register.start("Room 1", GasKind::NH3, timeline, at(0)).await);
        assert!(register.active().await.is_none());
    }
}
