//! Typed notifications about navigation mode changes.
//!
//! Subscribers get their own unbounded channel. Dropping the receiver is
//! enough to unsubscribe; the sender side is pruned on the next emit.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::state::NavModeKind;

/// Something observers may want to react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavEvent {
    /// The navigation mode changed.
    ModeChanged { from: NavModeKind, to: NavModeKind },
    /// User orbiting around a followed entity started or stopped.
    FollowOrbit { active: bool },
    /// An interpolation reached its destination.
    InterpolationFinished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Handle returned by [`Observers::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub receiver: Receiver<NavEvent>,
}

#[derive(Debug, Default)]
pub struct Observers {
    next_id: u64,
    senders: Vec<(SubscriptionId, Sender<NavEvent>)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let (tx, rx) = unbounded();
        self.senders.push((id, tx));
        Subscription { id, receiver: rx }
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.senders.len();
        self.senders.retain(|(sid, _)| *sid != id);
        self.senders.len() != before
    }

    pub fn emit(&mut self, event: NavEvent) {
        self.senders.retain(|(_, tx)| tx.send(event).is_ok());
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_receives_event() {
        let mut observers = Observers::new();
        let a = observers.subscribe();
        let b = observers.subscribe();
        observers.emit(NavEvent::InterpolationFinished);
        assert_eq!(a.receiver.try_recv(), Ok(NavEvent::InterpolationFinished));
        assert_eq!(b.receiver.try_recv(), Ok(NavEvent::InterpolationFinished));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut observers = Observers::new();
        let a = observers.subscribe();
        assert!(observers.unsubscribe(a.id));
        assert!(!observers.unsubscribe(a.id));
        observers.emit(NavEvent::FollowOrbit { active: true });
        assert!(a.receiver.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let mut observers = Observers::new();
        let a = observers.subscribe();
        let _b = observers.subscribe();
        drop(a);
        observers.emit(NavEvent::ModeChanged {
            from: NavModeKind::Idle,
            to: NavModeKind::Panning,
        });
        assert_eq!(observers.len(), 1);
    }
}
