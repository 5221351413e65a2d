//!
//! Optionally maskable values.
//!

use crate::{ExposeInterface, Secret};

///
/// An enum that allows us to optionally mask data, based on which variant the
/// data is stored in.
///
#[derive(Clone, Eq, PartialEq)]
pub enum Maskable<T: Eq + PartialEq + Clone> {
    /// Variant which masks the data by wrapping it in a Secret
    Masked(Secret<T>),
    /// Variant which doesn't mask the data
    Normal(T),
}

impl<T: std::fmt::Debug + Clone + Eq + PartialEq> std::fmt::Debug for Maskable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Masked(secret_value) => std::fmt::Debug::fmt(secret_value, f),
            Self::Normal(value) => std::fmt::Debug::fmt(value, f),
        }
    }
}

impl<T: Eq + PartialEq + Clone> Maskable<T> {
    ///
    /// Get the inner data while consuming self
    ///
    pub fn into_inner(self) -> T {
        match self {
            Self::Masked(inner_secret) => inner_secret.expose(),
            Self::Normal(inner) => inner,
        }
    }

    ///
    /// Whether the value is held in the masked variant
    ///
    pub fn is_masked(&self) -> bool {
        matches!(self, Self::Masked(_))
    }

    ///
    /// Create new masked data
    ///
    pub fn new_masked(item: Secret<T>) -> Self {
        Self::Masked(item)
    }

    ///
    /// Create new non-masked data
    ///
    pub fn new_normal(item: T) -> Self {
        Self::Normal(item)
    }
}

/// Trait for providing a method on custom types for creating [`Maskable`]
pub trait Mask {
    /// The inner type of the resulting [`Maskable`]
    type Output: Eq + Clone + PartialEq;

    ///
    /// Produce masked data from self
    ///
    fn into_masked(self) -> Maskable<Self::Output>;
}

impl Mask for String {
    type Output = Self;
    fn into_masked(self) -> Maskable<Self::Output> {
        Maskable::new_masked(self.into())
    }
}

impl Mask for Secret<String> {
    type Output = String;
    fn into_masked(self) -> Maskable<Self::Output> {
        Maskable::new_masked(self)
    }
}

impl<T: Eq + PartialEq + Clone> From<T> for Maskable<T> {
    fn from(value: T) -> Self {
        Self::new_normal(value)
    }
}

impl From<&str> for Maskable<String> {
    fn from(value: &str) -> Self {
        Self::new_normal(value.to_string())
    }
}
