//! Pet list loading port definition.

use crate::domain::entities::{PageRequest, Pet};
use crate::domain::errors::PetListError;
use crate::domain::task::Completion;

/// Port for loading one page of adoptable pets.
pub trait PetLoader: Send + Sync {
    /// Loads `page`, delivering the pets in server order.
    fn load(&self, page: PageRequest, completion: Completion<Vec<Pet>, PetListError>);
}

impl<T: PetLoader + ?Sized> PetLoader for std::sync::Arc<T> {
    fn load(&self, page: PageRequest, completion: Completion<Vec<Pet>, PetListError>) {
        (**self).load(page, completion);
    }
}
