//! Pointer-in-hull containment

use std::collections::BTreeMap;

use tracing::trace;
use tuio_core::messages::{AliveAssociation, ContainerAssociation, Pointer};
use tuio_core::{containment_in_bundle, Bundle, Point2, SessionId};

use crate::adaptor::{prepare_output, BundleProcessor};

/// Adds a `/tuio2/coa` for every convex hull that contains pointers, plus a
/// `/tuio2/ala` listing every associated session, before the closing alive
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainmentAdaptor;

impl ContainmentAdaptor {
    pub fn new() -> Self {
        Self
    }
}

impl BundleProcessor for ContainmentAdaptor {
    fn process_bundle(&mut self, input: &Bundle, output: &Bundle) -> tuio_core::Result<()> {
        prepare_output(input, output);

        let pointers: Vec<(SessionId, Point2)> = (0..output.count_of_type::<Pointer>())
            .filter_map(|i| output.message_of_type::<Pointer>(i))
            .map(|p| (p.session_id, Point2::new(p.x, p.y)))
            .collect();

        let mut containers: BTreeMap<SessionId, Vec<SessionId>> = BTreeMap::new();
        for (session, point) in pointers {
            if let Some(coa) = containment_in_bundle(output, point, session) {
                containers
                    .entry(coa.session_id)
                    .or_default()
                    .extend(coa.contained);
            }
        }
        if containers.is_empty() {
            return Ok(());
        }

        let mut associated: Vec<SessionId> = containers
            .iter()
            .flat_map(|(container, contained)| {
                std::iter::once(*container).chain(contained.iter().copied())
            })
            .collect();
        associated.sort_unstable();
        associated.dedup();

        let mut pos = match output.alive() {
            Some(_) => output.len() - 1,
            None => output.len(),
        };
        for (container, contained) in containers {
            trace!("Hull {} contains {:?}", container, contained);
            output.insert(pos, ContainerAssociation::new(container, 0, contained))?;
            pos += 1;
        }
        output.insert(pos, AliveAssociation::new(associated))?;
        Ok(())
    }
}
