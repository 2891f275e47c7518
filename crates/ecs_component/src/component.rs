//! Core [`Component`] trait and its type-erased counterpart.
//!
//! Every piece of data stored in the entity manager implements [`Component`].
//! The manager itself only ever sees `Box<dyn AnyComponent>`; the blanket
//! [`AnyComponent`] impl is what lets typed and untyped callers share one
//! store.
//!
//! ## Kind identity
//!
//! A component's kind is identified by [`ComponentTypeId`], derived from the
//! component's **string name** with the FNV-1a 64-bit hash. The id is stable
//! across builds and processes, which is what lets persisted rows name their
//! kind by string and still land in the right table on load.

use std::any::Any;

use serde::{Deserialize, Serialize};

/// A unique identifier for a component kind, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// FNV-1a 64-bit offset basis.
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

    /// FNV-1a 64-bit prime.
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Compute the [`ComponentTypeId`] from a component's string name.
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325
    /// for each byte in name.as_bytes():
    ///     hash = hash XOR byte
    ///     hash = hash * 0x00000100000001b3
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Compute the [`ComponentTypeId`] for a Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// The core component trait.
///
/// Components are plain data: serialisable so they can be persisted, and
/// `Send + Sync` so a manager holding them can be shared across threads.
///
/// # Examples
///
/// ```rust
/// use serde::{Serialize, Deserialize};
/// use ecs_component::Component;
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {
///     fn type_name() -> &'static str { "Position" }
/// }
/// ```
pub trait Component: Send + Sync + 'static + Serialize + for<'de> Deserialize<'de> {
    /// A human-readable name for this component kind. Must be unique among
    /// the kinds stored in one manager.
    fn type_name() -> &'static str;

    /// Returns the [`ComponentTypeId`] for this component.
    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }
}

/// Type-erased view of a [`Component`].
///
/// Implemented for every `T: Component`; there is no reason to implement it
/// by hand.
pub trait AnyComponent: Any + Send + Sync + 'static {
    /// The kind this component is stored under.
    fn kind(&self) -> ComponentTypeId;

    /// The kind's human-readable name.
    fn kind_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Serialise the component to MessagePack with named fields.
    ///
    /// # Errors
    ///
    /// Propagates the component's own `Serialize` failure.
    fn encode(&self) -> Result<Vec<u8>, rmp_serde::encode::Error>;
}

impl<T: Component> AnyComponent for T {
    fn kind(&self) -> ComponentTypeId {
        T::component_type_id()
    }

    fn kind_name(&self) -> &'static str {
        T::type_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn encode(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(self)
    }
}

impl dyn AnyComponent {
    /// Returns `true` if the erased component is a `T`.
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow the erased component as a `T`.
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Mutably borrow the erased component as a `T`.
    #[must_use]
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

impl std::fmt::Debug for dyn AnyComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnyComponent({})", self.kind_name())
    }
}
