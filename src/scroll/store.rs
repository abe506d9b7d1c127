use super::ScrollProgress;

/// What every reader of scroll state sees for one publish.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollSnapshot {
    pub progress: ScrollProgress,
    pub section: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ScrollSnapshot)>;

/// Single source of scroll truth. The controller publishes, everything else
/// subscribes or reads a selector.
pub struct ScrollStore {
    snapshot: ScrollSnapshot,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl Default for ScrollStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollStore {
    pub fn new() -> Self {
        Self {
            snapshot: ScrollSnapshot::default(),
            subscribers: Vec::new(),
            next_id: 1,
        }
    }

    pub fn snapshot(&self) -> ScrollSnapshot {
        self.snapshot
    }

    /// Read-only derived view for a consumer that only cares about part of
    /// the state.
    pub fn select<T>(&self, selector: impl FnOnce(&ScrollSnapshot) -> T) -> T {
        selector(&self.snapshot)
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&ScrollSnapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Stores the snapshot and notifies subscribers synchronously. Returns
    /// false (and notifies nobody) when nothing changed.
    pub fn publish(&mut self, snapshot: ScrollSnapshot) -> bool {
        if snapshot == self.snapshot {
            return false;
        }
        self.snapshot = snapshot;
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&snapshot);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn snapshot(progress: f32, section: usize) -> ScrollSnapshot {
        ScrollSnapshot {
            progress: ScrollProgress::new(progress),
            section,
        }
    }

    #[test]
    fn subscribers_see_every_change_in_order() {
        let mut store = ScrollStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |snap| sink.borrow_mut().push(snap.section));

        store.publish(snapshot(0.3, 1));
        store.publish(snapshot(0.6, 2));
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn unchanged_snapshot_is_not_republished() {
        let mut store = ScrollStore::new();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        store.subscribe(move |_| *sink.borrow_mut() += 1);

        assert!(store.publish(snapshot(0.5, 2)));
        assert!(!store.publish(snapshot(0.5, 2)));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut store = ScrollStore::new();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let id = store.subscribe(move |_| *sink.borrow_mut() += 1);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.publish(snapshot(0.9, 3));
        assert_eq!(*count.borrow(), 0);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn selectors_read_current_state() {
        let mut store = ScrollStore::new();
        store.publish(snapshot(0.75, 3));
        assert_eq!(store.select(|snap| snap.section), 3);
        assert_eq!(store.select(|snap| snap.progress.get()), 0.75);
    }
}
