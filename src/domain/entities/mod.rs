//! Domain entity definitions.

mod cached_photo;
mod page;
mod pet;

pub use cached_photo::CachedPhoto;
pub use page::PageRequest;
pub use pet::{AgeGroup, BodySize, Flag, Pet, PetId, Sex, parse_photo_url, parse_published_date};
