//! Interest Sets
//!
//! An interest set records which outputs of which sources a consumer needs
//! kept fresh. It holds shared ownership of every source it names, so a
//! source referenced only through an interest set stays alive for as long
//! as the planner keeps the set.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::capability::Source;
use crate::error::{Error, Result};
use crate::ids::{OutputId, SourceId};

#[derive(Clone)]
struct Interest {
    source: Arc<dyn Source>,
    outputs: SmallVec<[OutputId; 4]>,
}

/// The `(source, output)` pairs a consumer needs.
#[derive(Clone, Default)]
pub struct InterestSet {
    entries: IndexMap<SourceId, Interest>,
}

impl InterestSet {
    /// Create an empty interest set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `output` of `source`.
    ///
    /// The output must be usable on `source` right now. Requesting a pair
    /// twice is a no-op. A different object reporting the id of a source
    /// already in the set fails with [`Error::DuplicateSourceId`].
    pub fn add(&mut self, source: Arc<dyn Source>, output: OutputId) -> Result<()> {
        source.check_output(output)?;
        self.insert(&source, output)
    }

    /// Request several outputs of `source`.
    pub fn add_outputs<I>(&mut self, source: Arc<dyn Source>, outputs: I) -> Result<()>
    where
        I: IntoIterator<Item = OutputId>,
    {
        for output in outputs {
            self.add(Arc::clone(&source), output)?;
        }
        Ok(())
    }

    /// Request every output currently enabled on `source`.
    pub fn add_all(&mut self, source: Arc<dyn Source>) -> Result<()> {
        let enabled: Vec<OutputId> = source
            .outputs()
            .enabled()
            .filter(|o| source.is_output_dynamically_enabled(*o))
            .collect();
        self.add_outputs(source, enabled)
    }

    /// Forget everything requested from `source`.
    pub fn remove_source(&mut self, source: SourceId) -> bool {
        self.entries.shift_remove(&source).is_some()
    }

    /// Forget one requested output. The source is released when none remain.
    pub fn remove_output(&mut self, source: SourceId, output: OutputId) -> bool {
        let Some(entry) = self.entries.get_mut(&source) else {
            return false;
        };
        let Some(pos) = entry.outputs.iter().position(|o| *o == output) else {
            return false;
        };
        entry.outputs.remove(pos);
        if entry.outputs.is_empty() {
            self.entries.shift_remove(&source);
        }
        true
    }

    /// Whether any output of `source` is requested.
    pub fn contains_source(&self, source: SourceId) -> bool {
        self.entries.contains_key(&source)
    }

    /// Whether `output` of `source` is requested.
    pub fn contains(&self, source: SourceId, output: OutputId) -> bool {
        self.entries
            .get(&source)
            .map(|e| e.outputs.contains(&output))
            .unwrap_or(false)
    }

    /// Every requested pair, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<dyn Source>, OutputId)> + '_ {
        self.entries
            .values()
            .flat_map(|e| e.outputs.iter().map(move |o| (&e.source, *o)))
    }

    /// Distinct sources, in insertion order.
    pub fn sources(&self) -> impl Iterator<Item = &Arc<dyn Source>> + '_ {
        self.entries.values().map(|e| &e.source)
    }

    /// Number of requested pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(|e| e.outputs.len()).sum()
    }

    /// Whether nothing is requested.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge every pair of `other` into this set.
    ///
    /// Stops at the first source whose id is already taken by another object.
    pub fn extend(&mut self, other: &InterestSet) -> Result<()> {
        for (source, output) in other.iter() {
            self.insert(source, output)?;
        }
        Ok(())
    }

    fn insert(&mut self, source: &Arc<dyn Source>, output: OutputId) -> Result<()> {
        let source_id = source.source_id();
        let entry = self
            .entries
            .entry(source_id)
            .or_insert_with(|| Interest {
                source: Arc::clone(source),
                outputs: SmallVec::new(),
            });
        if !Arc::ptr_eq(&entry.source, source) {
            return Err(Error::DuplicateSourceId { source_id });
        }
        if !entry.outputs.contains(&output) {
            entry.outputs.push(output);
        }
        Ok(())
    }
}

impl fmt::Debug for InterestSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(id, e)| (id, e.outputs.as_slice())),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capabilities;
    use crate::ids::IdAllocator;
    use std::sync::LazyLock;

    static OUTPUTS: LazyLock<Capabilities> = LazyLock::new(|| {
        Capabilities::builder("Variable")
            .names(["Value", "Velocity", "Unused"])
            .revoke_named(["Unused"])
            .build()
            .unwrap()
    });

    const VALUE: OutputId = OutputId::new(0);
    const VELOCITY: OutputId = OutputId::new(1);
    const UNUSED: OutputId = OutputId::new(2);

    struct Variable {
        id: SourceId,
    }

    impl Source for Variable {
        fn source_id(&self) -> SourceId {
            self.id
        }

        fn outputs(&self) -> &Capabilities {
            &OUTPUTS
        }
    }

    fn variable(ids: &IdAllocator) -> Arc<dyn Source> {
        Arc::new(Variable { id: ids.next_id() })
    }

    #[test]
    fn duplicates_are_ignored() {
        let ids = IdAllocator::new();
        let x = variable(&ids);
        let mut interest = InterestSet::new();

        interest.add(Arc::clone(&x), VALUE).unwrap();
        interest.add(Arc::clone(&x), VALUE).unwrap();
        interest.add(Arc::clone(&x), VELOCITY).unwrap();

        assert_eq!(interest.len(), 2);
        assert_eq!(interest.sources().count(), 1);
        assert!(interest.contains(x.source_id(), VELOCITY));
    }

    #[test]
    fn disabled_outputs_are_rejected() {
        let ids = IdAllocator::new();
        let mut interest = InterestSet::new();

        let err = interest.add(variable(&ids), UNUSED).unwrap_err();
        assert!(matches!(err, Error::DisabledOutput { .. }));
        assert!(interest.is_empty());
    }

    #[test]
    fn add_all_skips_revoked_outputs() {
        let ids = IdAllocator::new();
        let x = variable(&ids);
        let mut interest = InterestSet::new();

        interest.add_all(Arc::clone(&x)).unwrap();
        assert_eq!(interest.len(), 2);
        assert!(!interest.contains(x.source_id(), UNUSED));
    }

    #[test]
    fn interest_keeps_sources_alive() {
        let ids = IdAllocator::new();
        let x = variable(&ids);
        let weak = Arc::downgrade(&x);
        let mut interest = InterestSet::new();

        interest.add(x, VALUE).unwrap();
        assert!(weak.upgrade().is_some());

        drop(interest);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn removing_last_output_releases_source() {
        let ids = IdAllocator::new();
        let x = variable(&ids);
        let y = variable(&ids);
        let mut interest = InterestSet::new();
        interest.add_outputs(Arc::clone(&x), [VALUE, VELOCITY]).unwrap();
        interest.add(Arc::clone(&y), VALUE).unwrap();

        assert!(interest.remove_output(x.source_id(), VALUE));
        assert!(interest.contains_source(x.source_id()));
        assert!(interest.remove_output(x.source_id(), VELOCITY));
        assert!(!interest.contains_source(x.source_id()));
        assert!(!interest.remove_output(x.source_id(), VELOCITY));

        assert!(interest.remove_source(y.source_id()));
        assert!(interest.is_empty());
    }

    #[test]
    fn extend_merges_without_duplicates() {
        let ids = IdAllocator::new();
        let x = variable(&ids);
        let mut a = InterestSet::new();
        let mut b = InterestSet::new();
        a.add(Arc::clone(&x), VALUE).unwrap();
        b.add_outputs(Arc::clone(&x), [VALUE, VELOCITY]).unwrap();

        a.extend(&b).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a.clone().len(), 2);
    }

    #[test]
    fn distinct_sources_sharing_an_id_are_rejected() {
        let x = variable(&IdAllocator::new());
        let y = variable(&IdAllocator::new());
        assert_eq!(x.source_id(), y.source_id());

        let mut interest = InterestSet::new();
        interest.add(Arc::clone(&x), VALUE).unwrap();
        assert_eq!(
            interest.add(Arc::clone(&y), VELOCITY),
            Err(Error::DuplicateSourceId {
                source_id: y.source_id()
            })
        );
        assert!(!interest.contains(x.source_id(), VELOCITY));

        let mut other = InterestSet::new();
        other.add(y, VALUE).unwrap();
        assert!(matches!(
            interest.extend(&other),
            Err(Error::DuplicateSourceId { .. })
        ));
        assert_eq!(interest.len(), 1);
    }
}
