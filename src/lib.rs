pub mod config;
pub mod kernel;

pub use kernel::bus::Bus;
pub use kernel::error::{DecodeError, PullError, RegistryError};
pub use kernel::event::{Event, EventKind};
pub use kernel::pull::{EventPuller, Pulled};
pub use kernel::registry::Registry;
