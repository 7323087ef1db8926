//! Circular dependency detection infrastructure.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

/// Default limit on nested constructions
pub(crate) const MAX_DEPTH: usize = 1024;

// Thread-local stack of concrete types currently under construction
thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<TypeKey>> = const { RefCell::new(Vec::new()) };
}

/// Guard for managing the thread-local construction stack.
///
/// Entering pushes the type; dropping pops it, so the stack unwinds with the
/// call graph whether construction succeeds or fails.
pub(crate) struct StackGuard {
    name: TypeKey,
}

impl StackGuard {
    pub(crate) fn enter(name: &TypeKey, max_depth: usize) -> DiResult<Self> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();

            // Circular detection BEFORE pushing the new name
            if stack.iter().any(|n| n == name) {
                let mut path = stack.clone();
                path.push(name.clone());
                return Err(DiError::Circular(path));
            }

            if stack.len() >= max_depth {
                return Err(DiError::DepthExceeded(stack.len()));
            }

            stack.push(name.clone());
            Ok(Self { name: name.clone() })
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert_eq!(popped.as_ref(), Some(&self.name));
        });
    }
}
