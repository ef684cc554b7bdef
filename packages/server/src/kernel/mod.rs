// Infrastructure seams: storage, spatial index, directories, event
// fan-out, scheduling, and optional capabilities.

pub mod ai;
pub mod deps;
pub mod directory;
pub mod event_bus;
pub mod geo_index;
pub mod scheduled_tasks;
pub mod store;
pub mod timeout;

pub use deps::ServerDeps;
pub use event_bus::EventBus;
pub use geo_index::{GeoEntry, GeoIndex};
pub use store::{InMemoryListingStore, ListingStore, StoreError, Versioned};
