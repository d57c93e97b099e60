//! Persistence boundary consumed by the HTTP handlers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::model::{Owner, Pet, PetType};

mod database;

pub use database::SeaOrmClinicService;

pub type SharedClinicService = Arc<dyn ClinicService>;

/// Lookups and mutations over the clinic's pets and their references.
///
/// Lookups return `Ok(None)` for an id that does not resolve; `Err` is
/// reserved for storage failures.
#[async_trait]
pub trait ClinicService: Send + Sync {
    async fn find_pet_by_id(&self, id: i32) -> Result<Option<Pet>, ServiceError>;

    async fn find_all_pets(&self) -> Result<Vec<Pet>, ServiceError>;

    /// The closed set of pet types, ordered by name.
    async fn find_pet_types(&self) -> Result<Vec<PetType>, ServiceError>;

    async fn find_pet_type_by_id(&self, id: i32) -> Result<Option<PetType>, ServiceError>;

    async fn find_owner_by_id(&self, id: i32) -> Result<Option<Owner>, ServiceError>;

    /// Inserts a new pet (assigning its id) or updates an existing one.
    async fn save_pet(&self, pet: &mut Pet) -> Result<(), ServiceError>;

    /// Removes the pet and its visits in a single transaction.
    async fn delete_pet(&self, pet: &Pet) -> Result<(), ServiceError>;
}
