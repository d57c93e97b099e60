//! Domain aggregates handed between the clinic service and the HTTP layer.
//!
//! These mirror the persisted rows but carry their relationships resolved:
//! a [`Pet`] owns its [`Owner`], its [`PetType`] and its visit history.

use chrono::NaiveDate;

use crate::entities::{owner, pet_type, visit};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PetType {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Owner {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visit {
    pub id: i32,
    pub pet_id: i32,
    pub date: NaiveDate,
    pub description: String,
}

/// A pet together with its resolved references.
///
/// `id` is `None` until the pet has been saved for the first time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pet {
    pub id: Option<i32>,
    pub name: String,
    pub birth_date: NaiveDate,
    pub pet_type: PetType,
    pub owner: Owner,
    pub visits: Vec<Visit>,
}

impl Pet {
    pub fn new(name: String, birth_date: NaiveDate, pet_type: PetType, owner: Owner) -> Self {
        Self {
            id: None,
            name,
            birth_date,
            pet_type,
            owner,
            visits: Vec::new(),
        }
    }
}

impl From<pet_type::Model> for PetType {
    fn from(model: pet_type::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

impl From<owner::Model> for Owner {
    fn from(model: owner::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            address: model.address,
            city: model.city,
            telephone: model.telephone,
        }
    }
}

impl From<visit::Model> for Visit {
    fn from(model: visit::Model) -> Self {
        Self {
            id: model.id,
            pet_id: model.pet_id,
            date: model.visit_date,
            description: model.description,
        }
    }
}
