//! Error types.

use std::error::Error as StdError;
use std::sync::Arc;

use crate::type_descriptor::TypeDescriptor;

/// The key used to resolve a dependency from a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Resolved by the type of anonymous values.
    Type(TypeDescriptor),
    /// Resolved by the name of a value.
    Name(String),
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Type(ty) => write!(f, "type `{ty}`"),
            Self::Name(name) => write!(f, "name `{name}`"),
        }
    }
}

/// [`Error`] is an error that can be raised by functions and methods from this library.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// The value passed to be invoked is not a callable handler.
    InvalidHandler(TypeDescriptor),
    /// A handler parameter was found neither in the registry nor in the supplemental arguments.
    MissingArgument(TypeDescriptor),
    /// A field is marked for injection, but the aggregate does not expose it for assignment.
    UnsettableField {
        aggregate: &'static str,
        field: &'static str,
    },
    /// A field marked for injection has no matching value in the registry.
    MissingDependency {
        aggregate: &'static str,
        field: &'static str,
        key: Key,
    },
    /// A resolved value cannot be assigned to its target.
    TypeMismatch {
        expected: TypeDescriptor,
        found: TypeDescriptor,
    },
    Other(Arc<dyn StdError + Send + Sync + 'static>),
}

impl Error {
    pub fn missing_argument<T>() -> Self
    where
        T: 'static,
    {
        Self::MissingArgument(TypeDescriptor::of::<T>())
    }

    pub fn unsettable_field<T>(field: &'static str) -> Self
    where
        T: 'static,
    {
        Self::UnsettableField {
            aggregate: std::any::type_name::<T>(),
            field,
        }
    }

    pub fn missing_dependency<T>(field: &'static str, key: Key) -> Self
    where
        T: 'static,
    {
        Self::MissingDependency {
            aggregate: std::any::type_name::<T>(),
            field,
            key,
        }
    }

    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self::Other(Arc::from(err.into()))
    }

    pub const fn is_invalid_handler(&self) -> bool {
        matches!(self, Self::InvalidHandler(_))
    }

    pub const fn is_missing_argument(&self) -> bool {
        matches!(self, Self::MissingArgument(_))
    }

    pub fn is_missing_argument_for<T>(&self) -> bool
    where
        T: 'static,
    {
        matches!(self, Self::MissingArgument(ty) if ty.is::<T>())
    }

    pub const fn is_unsettable_field(&self) -> bool {
        matches!(self, Self::UnsettableField { .. })
    }

    pub const fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingDependency { .. })
    }

    /// Returns `true` if this is a [`MissingDependency`](Self::MissingDependency) error for the
    /// value registered under `name`.
    pub fn is_missing_dependency_named(&self, name: &str) -> bool {
        matches!(self, Self::MissingDependency { key: Key::Name(n), .. } if n == name)
    }

    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    pub const fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHandler(ty) => {
                write!(f, "value of type `{ty}` is not a callable handler")
            }
            Self::MissingArgument(ty) => {
                write!(f, "no value of type `{ty}` is available as an argument")
            }
            Self::UnsettableField { aggregate, field } => {
                write!(
                    f,
                    "inject requested on field `{field}` of `{aggregate}`, which cannot be set"
                )
            }
            Self::MissingDependency {
                aggregate,
                field,
                key,
            } => {
                write!(
                    f,
                    "no value registered with {key} for field `{field}` of `{aggregate}`"
                )
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected value of type `{expected}`, found `{found}`")
            }
            Self::Other(error) => std::fmt::Display::fmt(error, f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Other(error) => Some(error),
            _ => None,
        }
    }
}

/// [`Result`] is an alias to [`core::result::Result`] with [`Error`] as the
/// default error type.
pub type Result<T, E = Error> = core::result::Result<T, E>;
