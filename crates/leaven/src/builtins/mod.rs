//! Builtin container and leaf-format handlers.
//!
//! Registered by default under `list`, `map`, `timestamp` (with the
//! `datetime` alias), and `uuid`. Container elements are new input
//! positions, so their probes start from a fresh cycle-detection path.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::handler::Handler;

mod list;
mod map;
mod timestamp;
mod uuid;

pub use self::list::ListHandler;
pub use self::map::MapHandler;
pub use self::timestamp::TimestampHandler;
pub use self::uuid::UuidHandler;

pub(crate) fn register_defaults(registry: &mut FxHashMap<String, Arc<dyn Handler>>) {
    let handlers: [Arc<dyn Handler>; 5] = [
        Arc::new(ListHandler::new()),
        Arc::new(MapHandler::new()),
        Arc::new(TimestampHandler::named("timestamp")),
        Arc::new(TimestampHandler::named("datetime")),
        Arc::new(UuidHandler::new()),
    ];
    for handler in handlers {
        registry.insert(handler.name().to_owned(), handler);
    }
}
