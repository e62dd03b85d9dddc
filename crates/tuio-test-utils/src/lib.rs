//! Common test helpers for TUIO tests
//!
//! - Tracing initialisation
//! - Sample bundles (frame, pointers, hull, alive)
//! - A listener that records what it was notified with

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use tuio_client::{BundleSource, Listener, ListenerRef};
use tuio_core::messages::{AliveMessage, ConvexHull, FrameMessage, Pointer};
use tuio_core::{Bundle, FrameId, Point2, SessionId, Timetag};

static TRACING: Once = Once::new();

/// Install a fmt subscriber honouring `RUST_LOG`, once per process
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Sample Bundles
// ============================================================================

/// Fixed timetag for reproducible bundles
pub const TEST_TIME: Timetag = Timetag {
    seconds: 3_900_000_000,
    fraction: 0,
};

/// The quadrilateral `[(-1,4), (-1,0), (3,0), (5,4)]`
pub fn sample_hull(session_id: SessionId) -> ConvexHull {
    ConvexHull::new(
        session_id,
        vec![
            Point2::new(-1.0, 4.0),
            Point2::new(-1.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(5.0, 4.0),
        ],
    )
}

/// Frame, one pointer per id, closing alive
pub fn pointer_bundle(frame_id: FrameId, sessions: &[SessionId]) -> Bundle {
    let bundle = Bundle::new();
    bundle.push(FrameMessage::new(frame_id, TEST_TIME));
    for (i, &id) in sessions.iter().enumerate() {
        bundle.push(Pointer::new(id, 0.1 * i as f32, 0.5));
    }
    bundle.push(AliveMessage::new(sessions.to_vec()));
    bundle
}

/// Frame, hull `hull_id`, pointer `hull_id + 1` at `point`, closing alive
pub fn hull_bundle(frame_id: FrameId, hull_id: SessionId, point: Point2) -> Bundle {
    let bundle = Bundle::new();
    bundle.push(FrameMessage::new(frame_id, TEST_TIME));
    bundle.push(sample_hull(hull_id));
    bundle.push(Pointer::new(hull_id + 1, point.x, point.y));
    bundle.push(AliveMessage::new(vec![hull_id, hull_id + 1]));
    bundle
}

// ============================================================================
// Recording Listener
// ============================================================================

/// Records the frame ids of every bundle it was notified with
#[derive(Debug, Default)]
pub struct RecordingListener {
    notifications: usize,
    frame_ids: Vec<FrameId>,
    bundles: Vec<Bundle>,
}

impl RecordingListener {
    /// Shared handle plus the same listener as a [`ListenerRef`]
    pub fn shared() -> (Rc<RefCell<RecordingListener>>, ListenerRef) {
        let recorder = Rc::new(RefCell::new(RecordingListener::default()));
        let listener: ListenerRef = recorder.clone();
        (recorder, listener)
    }

    pub fn notifications(&self) -> usize {
        self.notifications
    }

    pub fn frame_ids(&self) -> &[FrameId] {
        &self.frame_ids
    }

    /// Deep copies of every bundle seen, in order
    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    pub fn last_bundle(&self) -> Option<&Bundle> {
        self.bundles.last()
    }

    pub fn clear(&mut self) {
        self.notifications = 0;
        self.frame_ids.clear();
        self.bundles.clear();
    }
}

impl Listener for RecordingListener {
    fn notify(&mut self, source: &dyn BundleSource) {
        self.notifications += 1;
        for bundle in source.get_stack().iter() {
            if let Some(frame) = bundle.frame() {
                self.frame_ids.push(frame.frame_id);
            }
            self.bundles.push(bundle.deep_copy());
        }
    }
}
