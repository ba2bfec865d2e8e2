//! Core types and traits for `ioc` library.
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]

pub mod erased;
pub mod error;
pub mod field;
pub mod type_descriptor;

pub use erased::Erased;
pub use error::{Error, Key, Result};
pub use field::{FieldInfo, FieldValue, Inject, Marker, Slot};
pub use type_descriptor::TypeDescriptor;
