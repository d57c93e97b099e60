use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait};

use crate::entities::{pet, pet_type};

/// Row counts used to seed the gauges at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreCounts {
    pub pets: u64,
    pub pet_types: u64,
}

pub async fn init_metrics(db: &DatabaseConnection) -> Result<StoreCounts, DbErr> {
    let pets = pet::Entity::find().count(db).await?;
    metrics::gauge!("petclinic_pets_total").set(pets as f64);

    let pet_types = pet_type::Entity::find().count(db).await?;
    metrics::gauge!("petclinic_pet_types_total").set(pet_types as f64);

    tracing::info!("Initialized metrics: Pets={}, PetTypes={}", pets, pet_types);
    Ok(StoreCounts { pets, pet_types })
}

pub fn pet_created() {
    metrics::counter!("petclinic_pets_created_total").increment(1);
    metrics::gauge!("petclinic_pets_total").increment(1.0);
}

pub fn pet_updated() {
    metrics::counter!("petclinic_pets_updated_total").increment(1);
}

pub fn pet_deleted() {
    metrics::counter!("petclinic_pets_deleted_total").increment(1);
    metrics::gauge!("petclinic_pets_total").decrement(1.0);
}
