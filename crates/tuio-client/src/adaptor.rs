//! Adaptor chain nodes
//!
//! An [`Adaptor`] listens to an upstream source and is itself a source for
//! downstream listeners. On every notification it drains the upstream stack
//! in order, runs its [`BundleProcessor`] per bundle and notifies its own
//! listeners once the whole stack is processed.

use tracing::{trace, warn};
use tuio_core::{Bundle, BundleStack};

use crate::listener::{BundleSource, Listener, ListenerSet};

/// One transformation step of an adaptor chain
pub trait BundleProcessor {
    /// Write the transformed `input` into `output`.
    ///
    /// `input` and `output` may alias the same storage, in which case the
    /// processor edits in place. Call [`prepare_output`] first when starting
    /// from a copy of the input.
    fn process_bundle(&mut self, input: &Bundle, output: &Bundle) -> tuio_core::Result<()>;
}

/// Copy `input` into `output` unless both handles share storage
pub fn prepare_output(input: &Bundle, output: &Bundle) {
    if !input.ptr_eq(output) {
        output.copy_from(input);
    }
}

pub struct Adaptor<P: BundleProcessor> {
    processor: P,
    stack: BundleStack,
    listeners: ListenerSet,
    in_place: bool,
}

impl<P: BundleProcessor> Adaptor<P> {
    /// Each output is written into a fresh bundle
    pub fn new(processor: P) -> Self {
        Self {
            processor,
            stack: BundleStack::new(),
            listeners: ListenerSet::new(),
            in_place: false,
        }
    }

    /// Each output aliases its input bundle, so upstream handles observe
    /// the edits
    pub fn in_place(processor: P) -> Self {
        Self {
            in_place: true,
            ..Self::new(processor)
        }
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }

    pub fn stack_mut(&mut self) -> &mut BundleStack {
        &mut self.stack
    }
}

impl<P: BundleProcessor> Listener for Adaptor<P> {
    fn notify(&mut self, source: &dyn BundleSource) {
        self.purge();
        let mut upstream = source.get_stack();
        while let Some(input) = upstream.pop_oldest() {
            let output = if self.in_place {
                input.clone()
            } else {
                Bundle::new()
            };
            match self.processor.process_bundle(&input, &output) {
                Ok(()) => self.stack.push_back(output),
                Err(e) => warn!("Adaptor dropped bundle: {}", e),
            }
        }

        if self.stack.is_empty() {
            return;
        }
        trace!("Adaptor produced {} bundles", self.stack.len());
        self.listeners.notify_all(&*self);
    }
}

impl<P: BundleProcessor> BundleSource for Adaptor<P> {
    fn get_stack(&self) -> BundleStack {
        self.stack.clone()
    }

    fn purge(&mut self) {
        self.stack.clear();
    }

    fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    fn listeners_mut(&mut self) -> &mut ListenerSet {
        &mut self.listeners
    }
}
