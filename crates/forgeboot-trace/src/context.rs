//! Per-execution-context request identifier
//!
//! [`generate`], [`get`], [`set`] and [`clear`] act on the slot of the
//! calling execution context. Which slot that is depends on how the caller
//! entered the request:
//!
//! - Inside [`scope`]/[`scope_with`] (async) or [`sync_scope`]/
//!   [`sync_scope_with`] (sync) the slot is task-local. It is created when
//!   the scope starts and dropped when it ends, whether the body returns,
//!   panics or is cancelled, so a value can never outlive its request.
//! - Outside any scope the slot is thread-local. [`enter`] installs a value
//!   there and hands back a [`ThreadSlotGuard`] that clears it on drop.
//!
//! Contexts never share a slot, so there is no locking anywhere.
//!
//! ```rust,ignore
//! use forgeboot_trace::context;
//!
//! context::scope(async {
//!     let id = context::generate();
//!     assert_eq!(context::get(), Some(id));
//! }).await;
//! assert_eq!(context::get(), None);
//! ```

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::marker::PhantomData;

use crate::request_id::RequestId;
use crate::slot::RequestIdSlot;

tokio::task_local! {
    static TASK_SLOT: RefCell<RequestIdSlot>;
}

thread_local! {
    static THREAD_SLOT: RefCell<RequestIdSlot> = RefCell::new(RequestIdSlot::new());
    // Live guards on this thread, innermost last.
    static GUARD_FRAMES: RefCell<Vec<GuardFrame>> = const { RefCell::new(Vec::new()) };
    static NEXT_GUARD: Cell<u64> = const { Cell::new(0) };
}

#[derive(Debug)]
struct GuardFrame {
    token: u64,
    previous: Option<RequestId>,
}

/// Whether the caller runs inside a task-local scope
pub fn in_scope() -> bool {
    TASK_SLOT.try_with(|_| ()).is_ok()
}

fn with_slot<R>(f: impl FnOnce(&mut RequestIdSlot) -> R) -> R {
    if in_scope() {
        TASK_SLOT.with(|slot| f(&mut *slot.borrow_mut()))
    } else {
        THREAD_SLOT.with(|slot| f(&mut *slot.borrow_mut()))
    }
}

/// Generate a new identifier and install it in the current context
pub fn generate() -> RequestId {
    with_slot(RequestIdSlot::generate)
}

/// The current context's identifier, or `None` if none has been set
pub fn get() -> Option<RequestId> {
    with_slot(|slot| slot.get().cloned())
}

/// Install a caller-supplied identifier in the current context.
///
/// No validation happens here; identifiers taken from request headers
/// should go through [`RequestId::parse_external`] first.
pub fn set(id: impl Into<RequestId>) {
    let id = id.into();
    with_slot(move |slot| slot.set(id));
}

/// Remove the current context's identifier
pub fn clear() {
    with_slot(|slot| {
        slot.clear();
    });
}

/// Run `fut` with a fresh, empty task-local slot
pub async fn scope<F: Future>(fut: F) -> F::Output {
    TASK_SLOT.scope(RefCell::new(RequestIdSlot::new()), fut).await
}

/// Run `fut` with a task-local slot holding `id`
pub async fn scope_with<F: Future>(id: impl Into<RequestId>, fut: F) -> F::Output {
    TASK_SLOT
        .scope(RefCell::new(RequestIdSlot::with_id(id)), fut)
        .await
}

/// Run `f` with a fresh, empty task-local slot
pub fn sync_scope<R>(f: impl FnOnce() -> R) -> R {
    TASK_SLOT.sync_scope(RefCell::new(RequestIdSlot::new()), f)
}

/// Run `f` with a task-local slot holding `id`
pub fn sync_scope_with<R>(id: impl Into<RequestId>, f: impl FnOnce() -> R) -> R {
    TASK_SLOT.sync_scope(RefCell::new(RequestIdSlot::with_id(id)), f)
}

/// Install `id` in this thread's slot until the returned guard is dropped.
///
/// Meant for thread-per-request hosts that do not use scopes. Dropping the
/// innermost guard restores whatever the slot held before it (normally
/// nothing), including during unwinding. Dropping a guard that is not the
/// innermost leaves the slot alone and hands its saved value to the guard
/// above it, so an identifier whose guard is gone is never written back
/// and a pooled thread never carries it into its next request. Only code
/// running outside a task-local scope sees the thread slot.
#[must_use = "the identifier is cleared as soon as the guard is dropped"]
pub fn enter(id: impl Into<RequestId>) -> ThreadSlotGuard {
    let id = id.into();
    let previous = THREAD_SLOT.with(|slot| {
        let mut slot = slot.borrow_mut();
        let previous = slot.clear();
        slot.set(id);
        previous
    });

    let token = NEXT_GUARD.with(|next| {
        let token = next.get();
        next.set(token.wrapping_add(1));
        token
    });
    GUARD_FRAMES.with(|frames| frames.borrow_mut().push(GuardFrame { token, previous }));

    ThreadSlotGuard {
        token,
        _not_send: PhantomData,
    }
}

/// Restores the thread-local slot on drop; see [`enter`]
#[derive(Debug)]
pub struct ThreadSlotGuard {
    token: u64,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ThreadSlotGuard {
    fn drop(&mut self) {
        // try_with: the thread may already be tearing down its locals
        let restore = GUARD_FRAMES.try_with(|frames| {
            let mut frames = frames.borrow_mut();
            let pos = frames.iter().position(|f| f.token == self.token)?;
            let frame = frames.remove(pos);
            match frames.get_mut(pos) {
                // an inner guard is still live and now owns the saved value
                Some(inner) => {
                    inner.previous = frame.previous;
                    None
                }
                None => Some(frame.previous),
            }
        });

        if let Ok(Some(previous)) = restore {
            let _ = THREAD_SLOT.try_with(|slot| {
                let mut slot = slot.borrow_mut();
                match previous {
                    Some(id) => slot.set(id),
                    None => {
                        slot.clear();
                    }
                }
            });
        }
    }
}
