//! Form state: the descriptor plus the dirty flags presentation code reads.

use brokerform_types::Descriptor;
use serde::{Deserialize, Serialize};

/// A broker descriptor being edited.
///
/// Values are never mutated in place by the engine: [`crate::kernel::apply`]
/// borrows a state and returns a new one, so older states held elsewhere
/// stay valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    descriptor: Descriptor,
    has_changes: bool,
    yaml_unsaved: bool,
}

impl FormState {
    /// Wraps a freshly loaded descriptor. The form starts clean.
    ///
    /// The descriptor is taken as-is; use a `ReplaceDescriptor` command to
    /// hydrate one arriving from outside the engine.
    pub fn new(descriptor: Descriptor) -> Self {
        Self {
            descriptor,
            has_changes: false,
            yaml_unsaved: false,
        }
    }

    /// A clean form for the new-broker flow.
    pub fn new_broker() -> Self {
        Self::new(Descriptor::new())
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Hands the descriptor over for submission.
    pub fn into_descriptor(self) -> Descriptor {
        self.descriptor
    }

    /// True once an edit has been applied since the last load or save.
    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    /// True while raw text diverges from the structured descriptor.
    pub fn yaml_unsaved(&self) -> bool {
        self.yaml_unsaved
    }

    /// Returns the state after an edit produced `descriptor`.
    pub(crate) fn with_edit(&self, descriptor: Descriptor) -> Self {
        Self {
            descriptor,
            has_changes: true,
            yaml_unsaved: self.yaml_unsaved,
        }
    }

    /// Returns the state after a wholesale replacement.
    pub(crate) fn replaced(descriptor: Descriptor, has_changes: bool) -> Self {
        Self {
            descriptor,
            has_changes,
            yaml_unsaved: false,
        }
    }

    pub(crate) fn with_yaml_unsaved(mut self, unsaved: bool) -> Self {
        self.yaml_unsaved = unsaved;
        self
    }

    pub(crate) fn saved(mut self) -> Self {
        self.has_changes = false;
        self.yaml_unsaved = false;
        self
    }
}
