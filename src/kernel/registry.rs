//! Discriminator → decoder table.
//!
//! Built once at startup through [`RegistryBuilder`] and never mutated afterwards.
//! A discriminator claimed twice is a startup error, not a silent overwrite.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::debug;

use super::error::{DecodeError, RegistryError};
use super::event::{self, Event, EventKind, GenericEvent};

type DecodeFn = fn(&[Value]) -> Result<Event, DecodeError>;

fn decode_as<K: EventKind>(tuple: &[Value]) -> Result<Event, DecodeError> {
    K::decode(tuple).map(Into::into)
}

#[derive(Default)]
pub struct RegistryBuilder {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims every discriminator of `K`.
    pub fn register<K: EventKind>(mut self) -> Result<Self, RegistryError> {
        for &name in K::TYPES {
            if self.decoders.contains_key(name) {
                return Err(RegistryError::DuplicateDiscriminator(name));
            }
            self.decoders.insert(name, decode_as::<K>);
        }
        Ok(self)
    }

    pub fn build(self) -> Registry {
        debug!(discriminators = self.decoders.len(), "event registry built");
        Registry { decoders: self.decoders }
    }
}

pub struct Registry {
    decoders: HashMap<&'static str, DecodeFn>,
}

fn sorted_names(decoders: &HashMap<&'static str, DecodeFn>) -> Vec<&'static str> {
    let mut names: Vec<_> = decoders.keys().copied().collect();
    names.sort_unstable();
    names
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("discriminators", &sorted_names(&self.decoders))
            .finish()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("discriminators", &sorted_names(&self.decoders))
            .finish()
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry holding every built-in event variant.
    pub fn standard() -> Result<Self, RegistryError> {
        Ok(event::register_all(RegistryBuilder::new())?.build())
    }

    pub fn contains(&self, discriminator: &str) -> bool {
        self.decoders.contains_key(discriminator)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decodes a raw tuple.
    ///
    /// Unknown (or non-string) discriminators become [`Event::Generic`]. A known
    /// discriminator whose payload fails validation is a [`DecodeError`].
    pub fn decode(&self, tuple: &[Value]) -> Result<Event, DecodeError> {
        let decoder = tuple
            .first()
            .and_then(Value::as_str)
            .and_then(|name| self.decoders.get(name));
        match decoder {
            Some(decode) => decode(tuple),
            None => Ok(Event::Generic(GenericEvent::new(tuple.to_vec()))),
        }
    }
}
