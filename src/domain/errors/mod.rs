//! Domain error types.

mod pet_list_error;
mod photo_error;
mod store_error;
mod transport_error;

pub use pet_list_error::PetListError;
pub use photo_error::PhotoError;
pub use store_error::StoreError;
pub use transport_error::TransportError;
