// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node observer lists.
//!
//! Observers are zero-argument callbacks invoked synchronously while the tree
//! resolves or evaluates interaction. Capture whatever state you need in the
//! closure (for example an `Rc<Cell<_>>`).

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// Node events an observer can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeEvent {
    /// Position, angle, or rotation pivot was re-resolved.
    PositionChange,
    /// Scale or size was re-resolved.
    SizeChange,
    /// Cumulative opacity was re-resolved.
    OpacityChange,
    /// Inherited tint was re-resolved.
    ColorChange,
    /// The pointer moved onto the node this frame.
    HoverEnter,
    /// The pointer is over the node; fires every frame while true.
    Hover,
    /// The pointer left the node this frame.
    HoverExit,
    /// The primary button went down while over the node.
    Press,
    /// The primary button went up while over the node.
    Release,
}

impl NodeEvent {
    const COUNT: usize = 9;

    const fn slot(self) -> usize {
        self as usize
    }
}

/// Handle returned by [`Tree::subscribe`](crate::Tree::subscribe).
///
/// Pass it to [`Tree::unsubscribe`](crate::Tree::unsubscribe) to remove the
/// observer again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub(crate) event: NodeEvent,
    pub(crate) key: u64,
}

impl Subscription {
    /// The event this subscription listens to.
    pub const fn event(&self) -> NodeEvent {
        self.event
    }
}

pub(crate) type Callback = Box<dyn FnMut()>;

#[derive(Default)]
pub(crate) struct Observers {
    lists: [Vec<(u64, Callback)>; NodeEvent::COUNT],
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: usize = self.lists.iter().map(Vec::len).sum();
        f.debug_struct("Observers")
            .field("total", &total)
            .finish_non_exhaustive()
    }
}

impl Observers {
    pub(crate) fn add(&mut self, event: NodeEvent, key: u64, callback: Callback) -> Subscription {
        self.lists[event.slot()].push((key, callback));
        Subscription { event, key }
    }

    pub(crate) fn remove(&mut self, sub: Subscription) -> bool {
        let list = &mut self.lists[sub.event.slot()];
        let before = list.len();
        list.retain(|(key, _)| *key != sub.key);
        list.len() != before
    }

    /// Invoke every observer of `event` in registration order.
    pub(crate) fn emit(&mut self, event: NodeEvent) {
        for (_, callback) in &mut self.lists[event.slot()] {
            callback();
        }
    }

    pub(crate) fn len(&self, event: NodeEvent) -> usize {
        self.lists[event.slot()].len()
    }

    pub(crate) fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::RefCell;

    #[test]
    fn emits_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();
        for tag in 0..3_u32 {
            let log = log.clone();
            observers.add(
                NodeEvent::SizeChange,
                u64::from(tag),
                Box::new(move || log.borrow_mut().push(tag)),
            );
        }
        observers.emit(NodeEvent::SizeChange);
        observers.emit(NodeEvent::PositionChange);
        assert_eq!(*log.borrow(), [0, 1, 2]);
    }

    #[test]
    fn remove_only_matching_key() {
        let mut observers = Observers::default();
        let a = observers.add(NodeEvent::Hover, 1, Box::new(|| {}));
        let _b = observers.add(NodeEvent::Hover, 2, Box::new(|| {}));
        assert!(observers.remove(a));
        assert!(!observers.remove(a), "second removal is a no-op");
        assert_eq!(observers.len(NodeEvent::Hover), 1);
        observers.clear();
        assert_eq!(observers.len(NodeEvent::Hover), 0);
    }
}
