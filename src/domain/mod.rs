//! Domain layer with core entities, task primitives and port definitions.

/// Cache freshness rule.
pub mod cache_policy;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Cancellable task primitives.
pub mod task;

pub use cache_policy::CachePolicy;
pub use entities::{CachedPhoto, PageRequest, Pet, PetId};
pub use errors::{PetListError, PhotoError, StoreError, TransportError};
pub use ports::{HttpClient, HttpResponse, PetLoader, PhotoCache, PhotoLoader, PhotoStore};
pub use task::{CompletedTask, Completion, CompletionSlot, ForwardingTask, LoadTask};
