use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Registro concorrente degli stream di risposta in corso, uno per utente.
///
/// Key: user_id, Value: istante di apertura dello stream
#[derive(Clone, Default)]
pub struct ActiveStreams {
    active: Arc<DashMap<i32, DateTime<Utc>>>,
}

impl ActiveStreams {
    pub fn new() -> Self {
        Self {
            active: Arc::new(DashMap::new()),
        }
    }

    /// Riserva lo slot dell'utente. `None` se ha già uno stream aperto.
    #[instrument(skip(self))]
    pub fn try_acquire(&self, user_id: i32) -> Option<StreamSlot> {
        match self.active.entry(user_id) {
            Entry::Occupied(entry) => {
                warn!("Stream already open since {}", entry.get());
                None
            }
            Entry::Vacant(entry) => {
                entry.insert(Utc::now());
                debug!("Stream slot acquired");
                Some(StreamSlot {
                    user_id,
                    active: self.active.clone(),
                })
            }
        }
    }

    pub fn is_streaming(&self, user_id: &i32) -> bool {
        self.active.contains_key(user_id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

/// Slot occupato finché lo stream è vivo; viene liberato al drop
pub struct StreamSlot {
    user_id: i32,
    active: Arc<DashMap<i32, DateTime<Utc>>>,
}

impl Drop for StreamSlot {
    fn drop(&mut self) {
        self.active.remove(&self.user_id);
        debug!(user_id = self.user_id, "Stream slot released");
    }
}

#[cfg(test)]
mod tests {
    use super::ActiveStreams;

    #[test]
    fn second_acquire_for_same_user_is_refused() {
        let streams = ActiveStreams::new();
        let slot = streams.try_acquire(1);
        assert!(slot.is_some());
        assert!(streams.try_acquire(1).is_none());
        assert!(streams.try_acquire(2).is_some());
    }

    #[test]
    fn dropping_the_slot_releases_the_user() {
        let streams = ActiveStreams::new();
        let slot = streams.try_acquire(1).unwrap();
        assert!(streams.is_streaming(&1));
        drop(slot);
        assert!(!streams.is_streaming(&1));
        assert_eq!(streams.active_count(), 0);
    }
}
