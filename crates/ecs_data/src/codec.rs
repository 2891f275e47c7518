//! Per-kind serialisation table.
//!
//! Components are written as MessagePack with named fields, via
//! [`AnyComponent::encode`]. Reading them back needs the concrete type, so
//! each persisted kind registers a decoder here, keyed by its
//! [`ComponentTypeId`].

use std::collections::HashMap;

use ecs_component::{AnyComponent, Component, ComponentTypeId, Entity};

use crate::error::DataError;

type DecodeFn = fn(&[u8]) -> Result<Box<dyn AnyComponent>, rmp_serde::decode::Error>;

struct Codec {
    name: &'static str,
    decode: DecodeFn,
}

fn decode_as<T: Component>(
    bytes: &[u8],
) -> Result<Box<dyn AnyComponent>, rmp_serde::decode::Error> {
    let component: T = rmp_serde::from_slice(bytes)?;
    Ok(Box::new(component))
}

/// Registry of the component kinds that can be persisted.
#[derive(Default)]
pub struct ComponentCodecs {
    by_kind: HashMap<ComponentTypeId, Codec>,
}

impl ComponentCodecs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` as a persistable kind. Registering twice is a no-op.
    pub fn register<T: Component>(&mut self) -> &mut Self {
        self.by_kind.entry(T::component_type_id()).or_insert(Codec {
            name: T::type_name(),
            decode: decode_as::<T>,
        });
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<T: Component>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Returns `true` if a codec is registered for `name`.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Names of every registered kind, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.by_kind.values().map(|codec| codec.name).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }

    /// Serialise a component held by `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownKind`] if the component's kind is not
    /// registered, or [`DataError::Encode`] if serialisation fails.
    pub fn encode(
        &self,
        entity: Entity,
        component: &dyn AnyComponent,
    ) -> Result<Vec<u8>, DataError> {
        if !self.by_kind.contains_key(&component.kind()) {
            return Err(DataError::UnknownKind(component.kind_name().to_owned()));
        }
        component.encode().map_err(|source| DataError::Encode {
            entity,
            kind: component.kind_name().to_owned(),
            source,
        })
    }

    /// Rebuild a component of kind `name` from its stored bytes.
    ///
    /// `entity` is the store-local id of the row, used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownKind`] if `name` is not registered, or
    /// [`DataError::Decode`] if the bytes do not decode as that kind.
    pub fn decode(
        &self,
        entity: u64,
        name: &str,
        bytes: &[u8],
    ) -> Result<Box<dyn AnyComponent>, DataError> {
        let codec = self
            .lookup(name)
            .ok_or_else(|| DataError::UnknownKind(name.to_owned()))?;
        (codec.decode)(bytes).map_err(|source| DataError::Decode {
            entity,
            kind: name.to_owned(),
            source,
        })
    }

    fn lookup(&self, name: &str) -> Option<&Codec> {
        // Guard against a hash collision mapping a foreign name onto a kind.
        self.by_kind
            .get(&ComponentTypeId::from_name(name))
            .filter(|codec| codec.name == name)
    }
}

impl std::fmt::Debug for ComponentCodecs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}
