//! Transient rendering-engine objects registered against model ids.
//!
//! These never enter the scene document.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque handle to a live engine object
#[derive(Clone)]
pub struct LiveModelHandle(Arc<dyn Any + Send + Sync>);

impl LiveModelHandle {
    pub fn new<T: Any + Send + Sync>(object: T) -> Self {
        Self(Arc::new(object))
    }

    /// Borrow the engine object as its concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Both handles point at the same engine object
    pub fn ptr_eq(&self, other: &LiveModelHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for LiveModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LiveModelHandle(..)")
    }
}
