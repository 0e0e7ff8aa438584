//! Error types for decoding, registration and pulling.
//!
//! - [`DecodeError`]: a registered discriminator whose payload failed validation.
//!   This is a programming error on the emitting side and is never swallowed.
//! - [`RegistryError`]: raised while building the decoder table at startup.
//! - [`PullError`]: what a pull point can surface to a loop.

use thiserror::Error;

use super::schema::Issue;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("signal `{discriminator}` failed shape validation: {}", join_issues(.issues))]
pub struct DecodeError {
    pub discriminator: String,
    pub issues: Vec<Issue>,
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two variants claim the same discriminator.
    #[error("event of type `{0}` has already been defined")]
    DuplicateDiscriminator(&'static str),
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PullError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Every sender of the bus is gone; nothing can ever be delivered again.
    #[error("signal bus closed")]
    Closed,
}

impl PullError {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            PullError::Decode(_) => "decode_mismatch",
            PullError::Closed => "bus_closed",
        }
    }
}
