//! Conversions between domain aggregates and their transport shapes.

use crate::dto::{PetDto, PetTypeDto, VisitDto};
use crate::model::{Pet, PetType, Visit};

pub fn to_pet_type_dto(pet_type: &PetType) -> PetTypeDto {
    PetTypeDto {
        id: Some(pet_type.id),
        name: pet_type.name.clone(),
    }
}

pub fn to_pet_type_dtos(pet_types: &[PetType]) -> Vec<PetTypeDto> {
    pet_types.iter().map(to_pet_type_dto).collect()
}

pub fn to_visit_dto(visit: &Visit) -> VisitDto {
    VisitDto {
        id: Some(visit.id),
        date: visit.date,
        description: visit.description.clone(),
        pet_id: Some(visit.pet_id),
    }
}

pub fn to_pet_dto(pet: &Pet) -> PetDto {
    PetDto {
        id: pet.id,
        name: Some(pet.name.clone()),
        birth_date: Some(pet.birth_date),
        owner_id: Some(pet.owner.id),
        type_id: Some(pet.pet_type.id),
        pet_type: Some(to_pet_type_dto(&pet.pet_type)),
        visits: pet.visits.iter().map(to_visit_dto).collect(),
    }
}

pub fn to_pets_dto(pets: &[Pet]) -> Vec<PetDto> {
    pets.iter().map(to_pet_dto).collect()
}
