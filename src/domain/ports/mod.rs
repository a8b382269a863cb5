mod http_client_port;
mod pet_loader_port;
mod photo_loader_port;
mod photo_store_port;

pub use http_client_port::{HttpClient, HttpResponse};
pub use pet_loader_port::PetLoader;
pub use photo_loader_port::{PhotoCache, PhotoLoader};
pub use photo_store_port::PhotoStore;
