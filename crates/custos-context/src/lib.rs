//! # custos-context
//!
//! Ambient per-request context propagation.
//!
//! `bind` makes a `RequestContext` retrievable via `current()` for the
//! dynamic extent of a closure — including every synchronous call it makes —
//! without threading the context through function signatures. Deep inside
//! data-access code, the audit writer and the tenant query guard read the
//! ambient context without the business domain passing it along.
//!
//! The carrier is a thread-local stack, not a process-global: two requests
//! handled on different threads can never observe each other's context,
//! which is the exact cross-request contamination this component exists to
//! prevent. Work handed to another thread rebinds explicitly by cloning the
//! context at the spawn site.
//!
//! ## Usage
//!
//! ```rust
//! use custos_contracts::RequestContext;
//!
//! let ctx = RequestContext::with_request_id("req-1").with_tenant("t1");
//! custos_context::bind(ctx, || {
//!     let current = custos_context::current().unwrap();
//!     assert_eq!(current.tenant_id.as_deref(), Some("t1"));
//! });
//! assert!(custos_context::current().is_none());
//! ```

use std::cell::RefCell;

use custos_contracts::RequestContext;

thread_local! {
    /// Stack of bound contexts for the current thread. The top is the one
    /// `current()` returns; nested binds shadow and restore on exit.
    static BOUND: RefCell<Vec<RequestContext>> = const { RefCell::new(Vec::new()) };
}

/// Pops the bound context when the enclosing `bind` frame ends, including
/// on unwind, so a panic inside the closure cannot leak a stale context
/// into unrelated work on the same thread.
struct Frame;

impl Drop for Frame {
    fn drop(&mut self) {
        BOUND.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Execute `f` with `ctx` bound as the ambient request context.
///
/// For the dynamic extent of `f` — all synchronous calls it makes —
/// `current()` returns a clone of `ctx`. Binds nest: an inner `bind`
/// shadows the outer context and restores it when the inner closure
/// returns. Binding never fails.
///
/// The binding is scoped to the calling thread. Spawning a thread inside
/// `f` starts with no context; clone the context into the spawned closure
/// and `bind` again there when background work should stay attributable.
pub fn bind<T>(ctx: RequestContext, f: impl FnOnce() -> T) -> T {
    BOUND.with(|stack| stack.borrow_mut().push(ctx));
    let _frame = Frame;
    f()
}

/// The ambient request context, or `None` outside any `bind` extent.
///
/// `None` is a valid, expected state meaning "platform/system context" —
/// background jobs and platform-admin requests run without a tenant. It is
/// never an error, and this function never panics.
pub fn current() -> Option<RequestContext> {
    BOUND.with(|stack| stack.borrow().last().cloned())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use custos_contracts::RequestContext;

    use super::{bind, current};

    fn ctx(request_id: &str, tenant: &str) -> RequestContext {
        RequestContext::with_request_id(request_id).with_tenant(tenant)
    }

    /// The context is visible inside the bind extent and gone afterwards.
    #[test]
    fn bind_scopes_context_to_closure() {
        assert!(current().is_none());

        bind(ctx("req-1", "t1"), || {
            let c = current().expect("context must be bound inside the closure");
            assert_eq!(c.request_id, "req-1");
            assert_eq!(c.tenant_id.as_deref(), Some("t1"));
        });

        assert!(current().is_none());
    }

    /// Nested binds shadow the outer context and restore it on exit.
    #[test]
    fn nested_bind_shadows_and_restores() {
        bind(ctx("outer", "t1"), || {
            assert_eq!(current().unwrap().request_id, "outer");

            bind(ctx("inner", "t2"), || {
                let c = current().unwrap();
                assert_eq!(c.request_id, "inner");
                assert_eq!(c.tenant_id.as_deref(), Some("t2"));
            });

            // The outer context is back after the inner frame ends.
            let c = current().unwrap();
            assert_eq!(c.request_id, "outer");
            assert_eq!(c.tenant_id.as_deref(), Some("t1"));
        });
    }

    /// A panic inside the closure still unwinds the binding.
    #[test]
    fn panicking_closure_restores_previous_context() {
        bind(ctx("outer", "t1"), || {
            let result = std::panic::catch_unwind(|| {
                bind(ctx("inner", "t2"), || {
                    panic!("boom");
                })
            });
            assert!(result.is_err());

            // The inner frame was popped during unwind.
            assert_eq!(current().unwrap().request_id, "outer");
        });
        assert!(current().is_none());
    }

    /// Two threads never observe each other's bound context.
    #[test]
    fn contexts_are_thread_isolated() {
        bind(ctx("main-req", "t-main"), || {
            let handle = std::thread::spawn(|| {
                // A fresh thread starts with no ambient context.
                assert!(current().is_none());

                bind(ctx("worker-req", "t-worker"), || {
                    current().unwrap().request_id
                })
            });

            let worker_id = handle.join().unwrap();
            assert_eq!(worker_id, "worker-req");

            // The main thread's binding is untouched.
            assert_eq!(current().unwrap().request_id, "main-req");
        });
    }

    /// Background work rebinds explicitly by cloning the context.
    #[test]
    fn spawned_thread_rebinds_cloned_context() {
        bind(ctx("req-bg", "t1"), || {
            let cloned = current().unwrap();
            let handle = std::thread::spawn(move || {
                bind(cloned, || current().unwrap().tenant_id)
            });
            assert_eq!(handle.join().unwrap().as_deref(), Some("t1"));
        });
    }
}
