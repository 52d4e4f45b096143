//! Thread-local slot for the next-method contract.
//!
//! A `sig` statement parks its mode here; the very next method definition in
//! the same body consumes it. One slot per thread, so an unconsumed
//! declaration on one thread never leaks into a body being built on another.

use std::cell::Cell;

use tenet_core::types::{EntityId, MethodMode};

/// A contract mode waiting for its method definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDeclaration {
    /// Runtime that opened the body.
    pub runtime: u64,
    pub entity: EntityId,
    pub mode: MethodMode,
}

thread_local! {
    static PENDING: Cell<Option<PendingDeclaration>> = const { Cell::new(None) };
}

/// Operations on the current thread's pending slot.
pub struct PendingSlot;

impl PendingSlot {
    /// Park a declaration. Returns the declaration already parked, if any,
    /// and leaves the slot untouched in that case.
    pub fn park(decl: PendingDeclaration) -> Result<(), PendingDeclaration> {
        PENDING.with(|slot| match slot.get() {
            Some(existing) => Err(existing),
            None => {
                slot.set(Some(decl));
                Ok(())
            }
        })
    }

    /// Consume the parked mode if it belongs to `entity` in `runtime`.
    pub fn take_for(runtime: u64, entity: EntityId) -> Option<MethodMode> {
        PENDING.with(|slot| match slot.get() {
            Some(p) if p.runtime == runtime && p.entity == entity => {
                slot.set(None);
                Some(p.mode)
            }
            _ => None,
        })
    }

    pub fn peek() -> Option<PendingDeclaration> {
        PENDING.with(|slot| slot.get())
    }

    /// Clear the slot only if it belongs to `entity` in `runtime`.
    pub fn clear_for(runtime: u64, entity: EntityId) -> Option<PendingDeclaration> {
        PENDING.with(|slot| match slot.get() {
            Some(p) if p.runtime == runtime && p.entity == entity => slot.take(),
            _ => None,
        })
    }

    pub fn clear() {
        PENDING.with(|slot| slot.set(None));
    }
}
