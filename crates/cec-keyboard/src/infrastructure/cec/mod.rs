//! CEC backends.
//!
//! - **`mock`** – a scriptable in-memory backend used by tests.
//! - **`libcec`** – the native backend, compiled only with the `libcec`
//!   feature because it links against the system libcec.

pub mod mock;

#[cfg(feature = "libcec")]
pub mod libcec;
