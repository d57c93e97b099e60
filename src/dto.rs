//! JSON shapes exchanged with HTTP clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::BindingErrors;
use crate::validation::{require, Constraint, FieldValue, Validator};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetTypeDto {
    pub id: Option<i32>,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitDto {
    pub id: Option<i32>,
    pub date: NaiveDate,
    pub description: String,
    pub pet_id: Option<i32>,
}

/// Transport shape of a pet.
///
/// Every field is optional on input so that missing values surface as field
/// errors instead of a parse failure. The pet type may be referenced either
/// through `typeId` or through the nested `type` object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetDto {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub owner_id: Option<i32>,
    pub type_id: Option<i32>,
    #[serde(rename = "type")]
    pub pet_type: Option<PetTypeDto>,
    #[serde(default)]
    pub visits: Vec<VisitDto>,
}

pub const PET_NAME_MAX_LENGTH: usize = 30;

/// A pet payload whose required fields are known to be present.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckedPet {
    pub name: String,
    pub birth_date: NaiveDate,
    pub type_id: i32,
    pub owner_id: Option<i32>,
}

impl PetDto {
    /// Referenced pet type id, `typeId` taking precedence over `type.id`.
    pub fn type_ref(&self) -> Option<i32> {
        self.type_id
            .or_else(|| self.pet_type.as_ref().and_then(|t| t.id))
    }

    pub fn validate(&self) -> Result<(), BindingErrors> {
        Validator::new("pet")
            .field(
                "name",
                FieldValue::from(self.name.as_deref()),
                &[
                    Constraint::Required,
                    Constraint::NotBlank,
                    Constraint::MaxLength(PET_NAME_MAX_LENGTH),
                ],
            )
            .field(
                "birthDate",
                FieldValue::from(self.birth_date),
                &[Constraint::Required],
            )
            .field(
                "type",
                FieldValue::from(self.type_ref()),
                &[Constraint::Required],
            )
            .finish()
    }

    /// Validates and hands back the required fields unwrapped. `ownerId`
    /// stays optional; its absence is reported separately by the handlers.
    pub fn into_checked(self) -> Result<CheckedPet, BindingErrors> {
        self.validate()?;
        let type_id = self.type_ref();
        Ok(CheckedPet {
            name: require("pet", "name", self.name)?,
            birth_date: require("pet", "birthDate", self.birth_date)?,
            type_id: require("pet", "type", type_id)?,
            owner_id: self.owner_id,
        })
    }
}
