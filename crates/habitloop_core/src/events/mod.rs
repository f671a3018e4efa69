//! In-process event bus for bookkeeping notifications.
//!
//! # Responsibility
//! - Keep an explicit registry of subscribers keyed by event kind.
//! - Queue published events and deliver them on the next dispatch cycle.
//!
//! # Invariants
//! - Queued events are delivered exactly once, in publish order.
//! - The bus is owned by its session; there is no process-global instance.

use crate::model::achievement::Achievement;
use chrono::NaiveDate;
use log::debug;
use std::collections::{BTreeMap, VecDeque};

/// Notifications emitted by the bookkeeping core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// An achievement moved from locked to unlocked. Emitted once per id.
    AchievementUnlocked(Achievement),
    /// First activation on a new calendar day.
    DayStarted {
        day: NaiveDate,
        previous: Option<NaiveDate>,
    },
}

impl CoreEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::AchievementUnlocked(_) => EventKind::AchievementUnlocked,
            Self::DayStarted { .. } => EventKind::DayStarted,
        }
    }
}

/// Subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    AchievementUnlocked,
    DayStarted,
}

impl EventKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::AchievementUnlocked => "achievement_unlocked",
            Self::DayStarted => "day_started",
        }
    }
}

/// Handle returned by `EventBus::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&CoreEvent)>;

/// Observer registry with a FIFO delivery queue.
#[derive(Default)]
pub struct EventBus {
    subscribers: BTreeMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    pending: VecDeque<CoreEvent>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`.
    ///
    /// Handlers of one kind run in subscription order.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&CoreEvent) + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Removes one subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for handlers in self.subscribers.values_mut() {
            if let Some(index) = handlers.iter().position(|(entry, _)| *entry == id) {
                handlers.remove(index);
                return true;
            }
        }
        false
    }

    /// Enqueues `event` for the next dispatch cycle.
    pub fn publish(&mut self, event: CoreEvent) {
        debug!(
            "event=bus_publish module=events status=queued kind={} pending={}",
            event.kind().as_str(),
            self.pending.len() + 1
        );
        self.pending.push_back(event);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Delivers every event queued before this call, oldest first.
    ///
    /// Returns the number of events delivered.
    pub fn dispatch_pending(&mut self) -> usize {
        let batch: Vec<CoreEvent> = self.pending.drain(..).collect();
        for event in &batch {
            if let Some(handlers) = self.subscribers.get_mut(&event.kind()) {
                for (_, handler) in handlers.iter_mut() {
                    handler(event);
                }
            }
        }
        batch.len()
    }

    /// Removes and returns queued events without invoking subscribers.
    pub fn drain_pending(&mut self) -> Vec<CoreEvent> {
        self.pending.drain(..).collect()
    }
}
