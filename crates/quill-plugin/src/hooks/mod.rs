//! Hook system: names and arguments, handler traits, ordered storage, and the bus.

pub mod bus;
pub mod definitions;
pub mod handler;
pub mod registry;

pub use bus::{DEFAULT_PRIORITY, HookBus};
pub use definitions::{HookArgs, HookName};
pub use handler::{ActionFn, ActionHandler, FilterFn, FilterHandler, HandlerError};
pub use registry::HookRegistry;
