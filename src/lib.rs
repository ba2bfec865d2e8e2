//! Runtime dependency registry.
//!
//! A [`Registry`] holds named or anonymous values. It fills the marked fields of registered
//! aggregates with [`Registry::populate`], and calls functions with parameters resolved from
//! its values with [`Registry::invoke`].
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]

#[macro_use]
pub(crate) mod macros;

pub mod descriptor;
pub mod handler;
pub mod registry;
pub mod shared;

#[doc(inline)]
pub use ioc_core::{
    Erased, Error, FieldInfo, FieldValue, Inject, Key, Marker, Result, Slot, TypeDescriptor,
    injectable,
};

pub use descriptor::Descriptor;
pub use handler::{AsyncHandler, Handler, HandlerObject};
pub use registry::{Registry, RegistryBuilder};
pub use shared::Shared;
