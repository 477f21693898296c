//! Contracts with the target's instrumentation layer: the payloads its feeds
//! carry, the queries an engine can make against a target, and the hub that
//! routes events to subscribers.

mod event;
mod hub;
mod resource;
mod script;
mod style_sheet;
mod target;

pub use event::*;
pub use hub::*;
pub use resource::*;
pub use script::*;
pub use style_sheet::*;
pub use target::*;
