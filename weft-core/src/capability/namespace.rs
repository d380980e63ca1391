//! Namespace Descriptors
//!
//! A namespace maps the names a type declares (outputs or updates) to dense
//! ids. A derived type's namespace is built by extending its base: the base's
//! names keep their ids and the new names are appended after them, so an id
//! valid for the base means the same thing for every type further down the
//! chain.
//!
//! Each namespace also carries a static enablement mask. A type may revoke
//! entries it inherited (or declared itself); the revocation is inherited by
//! every further extension unless that extension clears it again.

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexSet;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::ids::NamespaceIndex;

/// Fixed-size bit set over namespace positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct BitMask {
    words: SmallVec<[u64; 2]>,
}

impl BitMask {
    fn get(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .map(|word| word & (1u64 << (index % 64)) != 0)
            .unwrap_or(false)
    }

    fn set(&mut self, index: usize) {
        let word = index / 64;
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (index % 64);
    }

    fn clear(&mut self) {
        self.words.clear();
    }

    fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }
}

/// Build-once descriptor of a type's outputs or updates.
///
/// # Example
///
/// ```rust
/// use weft_core::capability::Capabilities;
///
/// let function = Capabilities::builder("Function")
///     .names(["Value", "Jacobian", "Velocity"])
///     .build()
///     .unwrap();
///
/// let linear = Capabilities::builder("LinearFunction")
///     .extends(&function)
///     .names(["B"])
///     .revoke_named(["Velocity"])
///     .build()
///     .unwrap();
///
/// assert_eq!(linear.id("B").unwrap(), weft_core::OutputId::new(3));
/// assert!(!linear.is_statically_enabled(linear.id("Velocity").unwrap()));
/// assert!(function.is_statically_enabled(function.id("Velocity").unwrap()));
/// ```
pub struct Namespace<I> {
    /// Name of the type that built this namespace.
    type_name: &'static str,

    /// Type names along the extension chain, root first.
    lineage: SmallVec<[&'static str; 4]>,

    /// Names in id order.
    names: IndexSet<&'static str>,

    /// Statically revoked positions.
    revoked: BitMask,

    _marker: PhantomData<fn() -> I>,
}

impl<I: NamespaceIndex> Namespace<I> {
    /// Start building the namespace of `type_name`.
    pub fn builder(type_name: &'static str) -> NamespaceBuilder<I> {
        NamespaceBuilder::new(type_name)
    }

    /// An empty namespace, for types that declare nothing.
    pub fn empty(type_name: &'static str) -> Self {
        Self {
            type_name,
            lineage: SmallVec::from_slice(&[type_name]),
            names: IndexSet::new(),
            revoked: BitMask::default(),
            _marker: PhantomData,
        }
    }

    /// Name of the type owning this namespace.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type names along the extension chain, root first.
    pub fn lineage(&self) -> &[&'static str] {
        &self.lineage
    }

    /// Whether `type_name` is this type or one of its bases.
    pub fn derives_from(&self, type_name: &str) -> bool {
        self.lineage.iter().any(|t| *t == type_name)
    }

    /// Total number of entries, including revoked ones.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the namespace declares nothing.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether `id` belongs to this namespace.
    pub fn contains(&self, id: I) -> bool {
        id.index() < self.names.len()
    }

    /// Name of the entry `id`.
    pub fn name(&self, id: I) -> Option<&'static str> {
        self.names.get_index(id.index()).copied()
    }

    /// Look up an id by name.
    pub fn id(&self, name: &str) -> Result<I> {
        self.names
            .get_index_of(name)
            .map(I::from_index)
            .ok_or_else(|| I::unknown(self.type_name, format!("'{name}'")))
    }

    /// Fail with the namespace's "unknown" error when `id` is out of range.
    pub fn require(&self, id: I) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(I::unknown(self.type_name, id.to_string()))
        }
    }

    /// Whether `id` exists and was not revoked for this type.
    ///
    /// Unknown ids are reported as disabled.
    pub fn is_statically_enabled(&self, id: I) -> bool {
        self.contains(id) && !self.revoked.get(id.index())
    }

    /// All ids in order.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        (0..self.names.len()).map(I::from_index)
    }

    /// Statically enabled ids in order.
    pub fn enabled(&self) -> impl Iterator<Item = I> + '_ {
        self.ids().filter(|id| !self.revoked.get(id.index()))
    }

    /// Number of revoked entries.
    pub fn revoked_count(&self) -> usize {
        self.revoked.count()
    }
}

impl<I> Clone for Namespace<I> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            lineage: self.lineage.clone(),
            names: self.names.clone(),
            revoked: self.revoked.clone(),
            _marker: PhantomData,
        }
    }
}

impl<I> fmt::Debug for Namespace<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("type_name", &self.type_name)
            .field("names", &self.names)
            .field("revoked", &self.revoked.count())
            .finish()
    }
}

/// Builder for [`Namespace`].
///
/// Errors are recorded as they happen and reported by [`build`](Self::build),
/// so declarations can be chained.
pub struct NamespaceBuilder<I> {
    namespace: Namespace<I>,
    error: Option<Error>,
}

impl<I: NamespaceIndex> NamespaceBuilder<I> {
    fn new(type_name: &'static str) -> Self {
        Self {
            namespace: Namespace::empty(type_name),
            error: None,
        }
    }

    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Inherit the names and revocations of `base`.
    ///
    /// Must come before any own names so the base ids are preserved.
    pub fn extends(mut self, base: &Namespace<I>) -> Self {
        if !self.namespace.names.is_empty() {
            let name = self.namespace.type_name;
            self.fail(I::unknown(
                name,
                format!("base '{}' declared after own names", base.type_name),
            ));
            return self;
        }
        let own = self.namespace.type_name;
        self.namespace.lineage = base.lineage.clone();
        self.namespace.lineage.push(own);
        self.namespace.names = base.names.clone();
        self.namespace.revoked = base.revoked.clone();
        self
    }

    /// Append the type's own names.
    pub fn names<N>(mut self, names: N) -> Self
    where
        N: IntoIterator<Item = &'static str>,
    {
        for name in names {
            if !self.namespace.names.insert(name) {
                let namespace = self.namespace.type_name;
                self.fail(Error::DuplicateName { namespace, name });
            }
        }
        self
    }

    /// Statically disable entries by id.
    pub fn revoke<R>(mut self, ids: R) -> Self
    where
        R: IntoIterator<Item = I>,
    {
        for id in ids {
            match self.namespace.require(id) {
                Ok(()) => self.namespace.revoked.set(id.index()),
                Err(e) => self.fail(e),
            }
        }
        self
    }

    /// Statically disable entries by name.
    pub fn revoke_named<R>(mut self, names: R) -> Self
    where
        R: IntoIterator<Item = &'static str>,
    {
        for name in names {
            match self.namespace.id(name) {
                Ok(id) => self.namespace.revoked.set(id.index()),
                Err(e) => self.fail(e),
            }
        }
        self
    }

    /// Re-enable everything revoked so far, inherited revocations included.
    pub fn clear_revocations(mut self) -> Self {
        self.namespace.revoked.clear();
        self
    }

    /// Finish the namespace, reporting the first declaration error.
    pub fn build(self) -> Result<Namespace<I>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.namespace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{OutputId, UpdateId};

    fn function() -> Namespace<OutputId> {
        Namespace::builder("Function")
            .names(["Value", "Jacobian", "Velocity", "NormalAcceleration"])
            .build()
            .unwrap()
    }

    #[test]
    fn extension_appends_after_base() {
        let base = function();
        let derived = Namespace::builder("LinearFunction")
            .extends(&base)
            .names(["B"])
            .build()
            .unwrap();

        assert_eq!(derived.len(), 5);
        for id in base.ids() {
            assert_eq!(base.name(id), derived.name(id));
        }
        assert_eq!(derived.id("B").unwrap(), OutputId::new(4));
        assert_eq!(derived.lineage(), &["Function", "LinearFunction"]);
        assert!(derived.derives_from("Function"));
    }

    #[test]
    fn duplicate_name_in_chain_is_rejected() {
        let base = function();
        let err = Namespace::builder("Broken")
            .extends(&base)
            .names(["Jacobian"])
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            Error::DuplicateName {
                namespace: "Broken",
                name: "Jacobian"
            }
        );
    }

    #[test]
    fn revocation_is_inherited_until_cleared() {
        let base = function();
        let velocity = base.id("Velocity").unwrap();

        let revoking = Namespace::builder("Static")
            .extends(&base)
            .revoke([velocity])
            .build()
            .unwrap();
        let further = Namespace::builder("StaticChild")
            .extends(&revoking)
            .names(["Extra"])
            .build()
            .unwrap();
        let cleared = Namespace::builder("Restored")
            .extends(&revoking)
            .clear_revocations()
            .build()
            .unwrap();

        assert!(base.is_statically_enabled(velocity));
        assert!(!revoking.is_statically_enabled(velocity));
        assert!(!further.is_statically_enabled(velocity));
        assert!(cleared.is_statically_enabled(velocity));
        assert_eq!(further.enabled().count(), 4);
    }

    #[test]
    fn revoking_unknown_id_fails() {
        let err = Namespace::<OutputId>::builder("Function")
            .names(["Value"])
            .revoke([OutputId::new(3)])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnknownOutput { .. }));

        let err = Namespace::<UpdateId>::builder("Node")
            .revoke_named(["Missing"])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnknownUpdate { .. }));
    }

    #[test]
    fn unknown_ids_are_not_enabled() {
        let ns = function();
        assert!(!ns.is_statically_enabled(OutputId::new(40)));
        assert!(ns.require(OutputId::new(40)).is_err());
        assert!(ns.id("Missing").is_err());
    }

    #[test]
    fn masks_beyond_one_word() {
        let names: Vec<&'static str> = (0..130)
            .map(|i| &*Box::leak(format!("o{i}").into_boxed_str()))
            .collect();
        let ns = Namespace::<OutputId>::builder("Wide")
            .names(names)
            .revoke([OutputId::new(129)])
            .build()
            .unwrap();

        assert!(ns.is_statically_enabled(OutputId::new(64)));
        assert!(!ns.is_statically_enabled(OutputId::new(129)));
        assert_eq!(ns.revoked_count(), 1);
    }
}
