//! Single-value holder for the current request identifier

use crate::request_id::RequestId;

/// Storage for at most one request identifier.
///
/// This is the explicit form of the request context: whoever owns the
/// request owns the slot, and the value goes away with it. The ambient
/// functions in [`crate::context`] keep one of these per execution context.
///
/// States are `unset` and `set`; `generate`/`set` move to `set` (replacing
/// any previous value) and `clear` returns to `unset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestIdSlot {
    current: Option<RequestId>,
}

impl RequestIdSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot already holding `id`
    pub fn with_id(id: impl Into<RequestId>) -> Self {
        Self {
            current: Some(id.into()),
        }
    }

    /// Install a freshly generated identifier and return it
    pub fn generate(&mut self) -> RequestId {
        let id = RequestId::generate();
        self.current = Some(id.clone());
        id
    }

    pub fn get(&self) -> Option<&RequestId> {
        self.current.as_ref()
    }

    /// Install a caller-supplied identifier, replacing any previous one
    pub fn set(&mut self, id: impl Into<RequestId>) {
        self.current = Some(id.into());
    }

    /// Remove the identifier, returning it if one was set
    pub fn clear(&mut self) -> Option<RequestId> {
        self.current.take()
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }
}
