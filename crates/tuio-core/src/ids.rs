//! Session and frame identifier management
//!
//! Session ids name a contact across bundles and are shared between every
//! message that describes it, so they are reference counted. Frame ids are a
//! plain monotonic counter.

use std::collections::BTreeMap;

use tracing::trace;

/// Contact/entity identifier. 0 is reserved.
pub type SessionId = u32;

/// Frame counter value. 0 marks an out-of-order frame.
pub type FrameId = u32;

/// Reserved "unused" session id
pub const UNUSED_SESSION_ID: SessionId = 0;

/// Reserved "out of order" frame id
pub const OUT_OF_ORDER_FRAME_ID: FrameId = 0;

/// Reference-counted registry of live session ids
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    counts: BTreeMap<SessionId, u32>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for `id`, returning the new count
    pub fn register_session_id(&mut self, id: SessionId) -> u32 {
        let count = self.counts.entry(id).or_insert(0);
        *count += 1;
        trace!(id, count = *count, "session registered");
        *count
    }

    /// Decrement the count for `id`, dropping it at zero.
    ///
    /// Unregistering an id that is not present is a no-op and returns 0.
    pub fn unregister_session_id(&mut self, id: SessionId) -> u32 {
        let Some(count) = self.counts.get_mut(&id) else {
            return 0;
        };
        *count -= 1;
        let remaining = *count;
        if remaining == 0 {
            self.counts.remove(&id);
        }
        trace!(id, count = remaining, "session unregistered");
        remaining
    }

    /// Next free id: current maximum + 1.
    ///
    /// Once `u32::MAX` is taken the smallest unregistered non-zero id is
    /// returned instead.
    pub fn get_next_session_id(&self) -> SessionId {
        match self.counts.keys().next_back() {
            None => 1,
            Some(&SessionId::MAX) => {
                let mut candidate: SessionId = 1;
                for &id in self.counts.range(1..).map(|(id, _)| id) {
                    if id != candidate {
                        break;
                    }
                    candidate = candidate.wrapping_add(1);
                }
                candidate
            }
            Some(max) => max + 1,
        }
    }

    /// Allocate the next id and register it in one step
    pub fn get_auto_session_id(&mut self) -> SessionId {
        let id = self.get_next_session_id();
        self.register_session_id(id);
        id
    }

    pub fn clear_session_registry(&mut self) {
        self.counts.clear();
    }

    pub fn is_registered(&self, id: SessionId) -> bool {
        self.counts.contains_key(&id)
    }

    pub fn refcount(&self, id: SessionId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// Registered ids in ascending order
    pub fn registered(&self) -> Vec<SessionId> {
        self.counts.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Monotonic frame id source
#[derive(Debug, Clone, Default)]
pub struct FrameManager {
    current: FrameId,
}

impl FrameManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the new frame id. Wraps to 1, never 0.
    pub fn get_next_frame_id(&mut self) -> FrameId {
        self.current = self.peek_next_frame_id();
        self.current
    }

    /// The id [`FrameManager::get_next_frame_id`] would return
    pub fn peek_next_frame_id(&self) -> FrameId {
        match self.current.wrapping_add(1) {
            OUT_OF_ORDER_FRAME_ID => 1,
            next => next,
        }
    }

    pub fn get_current_frame_id(&self) -> FrameId {
        self.current
    }
}
