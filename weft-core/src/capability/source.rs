//! Output Gate
//!
//! A source is anything exposing named outputs. Whether an output can be
//! used is decided in two layers:
//!
//! 1. Statically, by the type's [`Capabilities`] (revocations made when the
//!    type was declared).
//! 2. Dynamically, by the instance, through
//!    [`Source::is_output_dynamically_enabled`]. The default keeps every
//!    output enabled; types override it for data-dependent outputs.

use crate::error::{Error, Result};
use crate::ids::{OutputId, SourceId};
use crate::node::Node;

use super::Capabilities;

/// An entity exposing enable-able outputs.
pub trait Source: Send + Sync {
    /// Stable identity of this instance.
    fn source_id(&self) -> SourceId;

    /// The output namespace of this instance's type.
    fn outputs(&self) -> &Capabilities;

    /// Instance-level enablement, `true` unless overridden.
    fn is_output_dynamically_enabled(&self, _output: OutputId) -> bool {
        true
    }

    /// Type-level enablement only.
    fn is_output_statically_enabled(&self, output: OutputId) -> bool {
        self.outputs().is_statically_enabled(output)
    }

    /// Whether `output` can be used on this instance.
    fn is_output_enabled(&self, output: OutputId) -> bool {
        self.is_output_statically_enabled(output) && self.is_output_dynamically_enabled(output)
    }

    /// Check that `output` may be read or depended upon.
    ///
    /// Call this before reading an output's value. Unknown ids fail with
    /// [`Error::UnknownOutput`], revoked ones with [`Error::DisabledOutput`]
    /// and dynamically disabled ones with [`Error::UnusedOutput`].
    fn check_output(&self, output: OutputId) -> Result<()> {
        self.outputs().require(output)?;
        if !self.is_output_statically_enabled(output) {
            return Err(Error::DisabledOutput {
                source_id: self.source_id(),
                output,
            });
        }
        if !self.is_output_dynamically_enabled(output) {
            return Err(Error::UnusedOutput {
                source_id: self.source_id(),
                output,
            });
        }
        Ok(())
    }

    /// Display name of an output, for logs.
    fn output_name(&self, output: OutputId) -> &'static str {
        self.outputs().name(output).unwrap_or("<unknown>")
    }

    /// The schedulable view of this source, if it has one.
    fn as_node(&self) -> Option<&dyn Node> {
        None
    }
}
