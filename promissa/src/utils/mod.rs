//! Internal data structures shared by the runtime.

pub(crate) mod slab;
