use crate::beachline::ArcKey;
use crate::diagram::SiteKey;
use crate::geometry::Point;
use fnv::{FnvHashMap, FnvHashSet};
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;

/// Creation-sequence identity of an event; also the deterministic
/// tie-break for events sharing a y.
pub type EventId = u64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    /// A site enters the beachline.
    Site { site: SiteKey },
    /// Three arcs converge: `arc` is the middle arc about to be squeezed
    /// out at `point`.
    Circle { point: Point, arc: ArcKey },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub y: f64,
    pub kind: EventKind,
}

/// Largest y first, then oldest event first.
type Priority = (OrderedFloat<f64>, Reverse<EventId>);

/// The event queue: a max-heap on event y with lazy invalidation.
///
/// Superseded circle events are never removed from the heap; their ids go
/// into a side set that `pop` consults, so invalidation is O(1) and the
/// heap never needs random-access surgery.
pub struct EventQueue {
    heap: PriorityQueue<EventId, Priority>,
    pending: FnvHashMap<EventId, Event>,
    invalidated: FnvHashSet<EventId>,
    next_id: EventId,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue {
            heap: PriorityQueue::new(),
            pending: FnvHashMap::default(),
            invalidated: FnvHashSet::default(),
            next_id: 0,
        }
    }

    pub fn push_site_event(&mut self, y: f64, site: SiteKey) -> EventId {
        self.push(y, EventKind::Site { site })
    }

    pub fn push_circle_event(&mut self, y: f64, point: Point, arc: ArcKey) -> EventId {
        self.push(y, EventKind::Circle { point, arc })
    }

    fn push(&mut self, y: f64, kind: EventKind) -> EventId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert(id, Event { id, y, kind });
        self.heap.push(id, (OrderedFloat(y), Reverse(id)));
        id
    }

    /// Marks an event as stale. It stays in the heap and is discarded
    /// when popped.
    pub fn invalidate(&mut self, id: EventId) {
        self.invalidated.insert(id);
    }

    /// Pops the next live event in decreasing-y order, discarding any
    /// invalidated entries on the way.
    pub fn pop(&mut self) -> Option<Event> {
        while let Some((id, _)) = self.heap.pop() {
            let event = self.pending.remove(&id).unwrap();
            if self.invalidated.remove(&id) {
                continue;
            }
            return Some(event);
        }
        None
    }
}
