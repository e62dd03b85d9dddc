//! Bundles and bundle stacks
//!
//! A [`Bundle`] is a handle to shared message storage. Cloning the handle
//! aliases the storage: any mutation through one handle is visible through
//! every other handle on the same storage, including [`Bundle::clear`].
//! [`Bundle::deep_copy`] is the explicit copy-out that yields independent
//! storage.
//!
//! A well-formed outbound bundle opens with exactly one frame message and
//! closes with exactly one alive message; [`Bundle::check_output`] verifies
//! this.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use bytes::Bytes;
use rosc::{OscBundle, OscPacket};
use tracing::{debug, trace};

use crate::messages::{AliveMessage, FrameMessage, Message, TypedMessage};
use crate::time::{Timetag, IMMEDIATELY};
use crate::{Error, Result};

/// Index of the oldest bundle in a [`BundleStack`]
pub const OLDEST: usize = 0;

/// Shared, ordered list of messages describing one point in time
#[derive(Clone, Default)]
pub struct Bundle {
    inner: Rc<RefCell<Vec<Message>>>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(messages)),
        }
    }

    /// Insert at `pos`, shifting later messages back
    pub fn insert(&self, pos: usize, message: impl Into<Message>) -> Result<()> {
        let mut messages = self.inner.borrow_mut();
        if pos > messages.len() {
            return Err(Error::OutOfRange {
                index: pos,
                len: messages.len(),
            });
        }
        messages.insert(pos, message.into());
        Ok(())
    }

    pub fn push(&self, message: impl Into<Message>) {
        self.inner.borrow_mut().push(message.into());
    }

    pub fn remove(&self, index: usize) -> Result<Message> {
        let mut messages = self.inner.borrow_mut();
        if index >= messages.len() {
            return Err(Error::OutOfRange {
                index,
                len: messages.len(),
            });
        }
        Ok(messages.remove(index))
    }

    /// Keep only the messages matching `keep`
    pub fn retain(&self, keep: impl FnMut(&Message) -> bool) {
        self.inner.borrow_mut().retain(keep);
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Drop every message. Affects all handles sharing this storage.
    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }

    /// Whether both handles point at the same storage
    pub fn ptr_eq(&self, other: &Bundle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of handles sharing this storage
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Borrow the messages in order.
    ///
    /// # Panics
    ///
    /// Panics if a mutable borrow of the same storage is live.
    pub fn messages(&self) -> Ref<'_, [Message]> {
        Ref::map(self.inner.borrow(), |v| v.as_slice())
    }

    pub fn messages_mut(&self) -> RefMut<'_, Vec<Message>> {
        self.inner.borrow_mut()
    }

    pub fn get(&self, index: usize) -> Option<Message> {
        self.inner.borrow().get(index).cloned()
    }

    /// Copy every message into fresh storage
    pub fn deep_copy(&self) -> Bundle {
        Bundle::from_messages(self.inner.borrow().clone())
    }

    /// Replace this storage's contents with a deep copy of `source`
    pub fn copy_from(&self, source: &Bundle) {
        if self.ptr_eq(source) {
            return;
        }
        let copied = source.inner.borrow().clone();
        *self.inner.borrow_mut() = copied;
    }

    /// The `index`-th message of type `T`, counted in insertion order
    pub fn message_of_type<T: TypedMessage>(&self, index: usize) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.inner.borrow(), |v| {
            v.iter().filter_map(T::from_message).nth(index)
        })
        .ok()
    }

    pub fn message_of_type_mut<T: TypedMessage>(&self, index: usize) -> Option<RefMut<'_, T>> {
        RefMut::filter_map(self.inner.borrow_mut(), |v| {
            v.iter_mut().filter_map(T::from_message_mut).nth(index)
        })
        .ok()
    }

    pub fn count_of_type<T: TypedMessage>(&self) -> usize {
        self.inner
            .borrow()
            .iter()
            .filter(|m| m.kind() == T::KIND)
            .count()
    }

    /// Leading frame message, if the bundle opens with one
    pub fn frame(&self) -> Option<Ref<'_, FrameMessage>> {
        Ref::filter_map(self.inner.borrow(), |v| match v.first() {
            Some(Message::Frame(frame)) => Some(frame),
            _ => None,
        })
        .ok()
    }

    /// Closing alive message, if the bundle ends with one
    pub fn alive(&self) -> Option<Ref<'_, AliveMessage>> {
        Ref::filter_map(self.inner.borrow(), |v| match v.last() {
            Some(Message::Alive(alive)) => Some(alive),
            _ => None,
        })
        .ok()
    }

    /// Timetag of the leading frame, or "immediately"
    pub fn time(&self) -> Timetag {
        self.frame().map_or(IMMEDIATELY, |f| f.time)
    }

    /// Verify outbound framing: one leading frame, one closing alive
    pub fn check_output(&self) -> Result<()> {
        let messages = self.inner.borrow();
        let frames = messages.iter().filter(|m| m.is_frame()).count();
        let alives = messages.iter().filter(|m| m.is_alive()).count();
        if !messages.first().is_some_and(Message::is_frame) {
            return Err(Error::Malformed("bundle does not open with a frame".into()));
        }
        if !messages.last().is_some_and(Message::is_alive) {
            return Err(Error::Malformed("bundle does not close with alive".into()));
        }
        if frames != 1 || alives != 1 {
            return Err(Error::Malformed(format!(
                "expected one frame and one alive, found {} and {}",
                frames, alives
            )));
        }
        Ok(())
    }

    /// Imprint every message into one OSC bundle tagged with the frame time
    pub fn to_osc(&self) -> OscBundle {
        let mut osc = OscBundle {
            timetag: self.time().into(),
            content: Vec::with_capacity(self.len()),
        };
        for message in self.inner.borrow().iter() {
            message.imprint(&mut osc);
        }
        osc
    }

    /// Wire bytes of [`Bundle::to_osc`]
    pub fn encode(&self) -> Result<Bytes> {
        let packet = OscPacket::Bundle(self.to_osc());
        let buf = rosc::encoder::encode(&packet)?;
        trace!("Encoded bundle of {} messages into {} bytes", self.len(), buf.len());
        Ok(Bytes::from(buf))
    }
}

impl PartialEq for Bundle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.inner.borrow() == *other.inner.borrow()
    }
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("handles", &self.handle_count())
            .field("messages", &*self.inner.borrow())
            .finish()
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, message) in self.inner.borrow().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", message)?;
        }
        Ok(())
    }
}

impl From<Vec<Message>> for Bundle {
    fn from(messages: Vec<Message>) -> Self {
        Bundle::from_messages(messages)
    }
}

/// FIFO of bundles gathered in one load cycle, oldest first
#[derive(Debug, Clone, Default)]
pub struct BundleStack {
    bundles: VecDeque<Bundle>,
}

impl BundleStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, bundle: Bundle) {
        self.bundles.push_back(bundle);
    }

    /// Take the bundle at `index`, discarding every older bundle with it.
    ///
    /// Bundles newer than `index` stay on the stack. Fails without touching
    /// the stack when `index` is past the end.
    pub fn get_update(&mut self, index: usize) -> Result<Bundle> {
        if index >= self.bundles.len() {
            return Err(Error::OutOfRange {
                index,
                len: self.bundles.len(),
            });
        }
        if index > 0 {
            debug!("Discarding {} stale bundles", index);
            self.bundles.drain(..index);
        }
        self.bundles.pop_front().ok_or(Error::OutOfRange { index, len: 0 })
    }

    /// Take the newest bundle, discarding everything older
    pub fn get_latest(&mut self) -> Option<Bundle> {
        let last = self.bundles.len().checked_sub(1)?;
        self.get_update(last).ok()
    }

    pub fn pop_oldest(&mut self) -> Option<Bundle> {
        self.bundles.pop_front()
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bundle> + '_ {
        self.bundles.iter()
    }

    pub fn clear(&mut self) {
        self.bundles.clear();
    }
}

impl Extend<Bundle> for BundleStack {
    fn extend<I: IntoIterator<Item = Bundle>>(&mut self, iter: I) {
        self.bundles.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Pointer, Token};

    fn framed(frame_id: u32) -> Bundle {
        let bundle = Bundle::new();
        bundle.push(FrameMessage::new(frame_id, Timetag::new(10, 0)));
        bundle.push(Pointer::new(1, 0.1, 0.2));
        bundle.push(AliveMessage::new(vec![1]));
        bundle
    }

    #[test]
    fn test_alias_sees_mutation() {
        let a = framed(1);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        b.message_of_type_mut::<Pointer>(0).unwrap().x = 0.9;
        assert_eq!(a.message_of_type::<Pointer>(0).unwrap().x, 0.9);
        b.clear();
        assert!(a.is_empty());
    }

    #[test]
    fn test_deep_copy_isolates() {
        let a = framed(1);
        let b = a.deep_copy();
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        b.message_of_type_mut::<Pointer>(0).unwrap().x = 0.9;
        assert_eq!(a.message_of_type::<Pointer>(0).unwrap().x, 0.1);
    }

    #[test]
    fn test_copy_from_self_is_noop() {
        let a = framed(1);
        a.copy_from(&a.clone());
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_message_of_type_counts_matches() {
        let bundle = framed(1);
        bundle.insert(2, Token::new(5, 0, 0.0, 0.0, 0.0)).unwrap();
        bundle.insert(2, Pointer::new(2, 0.0, 0.0)).unwrap();
        assert_eq!(bundle.count_of_type::<Pointer>(), 2);
        assert_eq!(bundle.message_of_type::<Pointer>(1).unwrap().session_id, 2);
        assert!(bundle.message_of_type::<Pointer>(2).is_none());
        assert!(bundle.insert(99, Pointer::new(3, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_check_output() {
        assert!(framed(1).check_output().is_ok());

        let no_alive = framed(1);
        no_alive.remove(2).unwrap();
        assert!(matches!(no_alive.check_output(), Err(Error::Malformed(_))));

        let double = framed(1);
        double.insert(1, AliveMessage::default()).unwrap();
        assert!(double.check_output().is_err());
    }

    #[test]
    fn test_encode_carries_frame_time() {
        let bundle = framed(4);
        let osc = bundle.to_osc();
        assert_eq!(Timetag::from(osc.timetag), Timetag::new(10, 0));
        assert_eq!(osc.content.len(), 3);
        assert!(!bundle.encode().unwrap().is_empty());
    }

    #[test]
    fn test_stack_prefix_consume() {
        let mut stack = BundleStack::new();
        for id in 1..=4 {
            stack.push_back(framed(id));
        }
        let b = stack.get_update(2).unwrap();
        assert_eq!(b.frame().unwrap().frame_id, 3);
        assert_eq!(stack.len(), 1);
        assert!(matches!(
            stack.get_update(1),
            Err(Error::OutOfRange { index: 1, len: 1 })
        ));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.get_update(OLDEST).unwrap().frame().unwrap().frame_id, 4);
        assert!(stack.is_empty());
    }
}
