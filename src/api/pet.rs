use axum::{
    extract::{rejection::JsonRejection, Extension, Json, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;

use crate::dto::PetDto;
use crate::error::{ApiError, BindingError, BindingErrors};
use crate::mapper;
use crate::metrics;
use crate::model::{Owner, Pet, PetType};
use crate::service::{ClinicService, SharedClinicService};

/// Fields of a pet payload that passed validation, with references resolved.
struct ResolvedPet {
    name: String,
    birth_date: NaiveDate,
    pet_type: PetType,
    owner: Owner,
}

fn record_action(action: &'static str) {
    tracing::Span::current()
        .record("table", "pets")
        .record("action", action);
}

fn unreadable_body(rejection: JsonRejection) -> ApiError {
    ApiError::InvalidPayload(BindingErrors::from(BindingError {
        object_name: "pet".to_string(),
        field_name: "body".to_string(),
        field_value: String::new(),
        error_message: rejection.body_text(),
    }))
}

/// Runs the checks shared by create and update, in order: field
/// constraints, owner id presence, pet type lookup, owner lookup.
async fn resolve_payload(
    clinic: &dyn ClinicService,
    payload: Result<Json<PetDto>, JsonRejection>,
) -> Result<ResolvedPet, ApiError> {
    let Json(dto) = payload.map_err(unreadable_body)?;
    // Field errors win over a missing owner id: a payload that fails both is
    // answered with the itemized field errors, still as a 400.
    let checked = dto.into_checked().map_err(ApiError::InvalidPayload)?;
    let owner_id = checked.owner_id.ok_or(ApiError::MissingOwnerId)?;

    let pet_type = clinic
        .find_pet_type_by_id(checked.type_id)
        .await?
        .ok_or(ApiError::UnknownPetType)?;
    let owner = clinic
        .find_owner_by_id(owner_id)
        .await?
        .ok_or(ApiError::UnknownOwner)?;

    Ok(ResolvedPet {
        name: checked.name,
        birth_date: checked.birth_date,
        pet_type,
        owner,
    })
}

// GET /api/pets/:pet_id
pub async fn get_pet(
    Extension(clinic): Extension<SharedClinicService>,
    Path(pet_id): Path<i32>,
) -> Result<Response, ApiError> {
    record_action("get_pet");
    tracing::Span::current().record("pet_id", pet_id);

    let pet = clinic
        .find_pet_by_id(pet_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok((StatusCode::OK, Json(mapper::to_pet_dto(&pet))).into_response())
}

// GET /api/pets
// An empty store answers 404 rather than an empty list; clients depend on it.
pub async fn list_pets(
    Extension(clinic): Extension<SharedClinicService>,
) -> Result<Response, ApiError> {
    record_action("list_pets");

    let pets = clinic.find_all_pets().await?;
    if pets.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok((StatusCode::OK, Json(mapper::to_pets_dto(&pets))).into_response())
}

// GET /api/pets/pettypes
// Unlike list_pets, an empty type list is still a 200.
pub async fn list_pet_types(
    Extension(clinic): Extension<SharedClinicService>,
) -> Result<Response, ApiError> {
    record_action("list_pet_types");

    let pet_types = clinic.find_pet_types().await?;
    Ok((StatusCode::OK, Json(mapper::to_pet_type_dtos(&pet_types))).into_response())
}

// POST /api/pets/
// Answers 204 and still sends the created pet in the body.
pub async fn create_pet(
    Extension(clinic): Extension<SharedClinicService>,
    payload: Result<Json<PetDto>, JsonRejection>,
) -> Result<Response, ApiError> {
    record_action("create_pet");

    let resolved = resolve_payload(clinic.as_ref(), payload).await?;
    let mut pet = Pet::new(
        resolved.name,
        resolved.birth_date,
        resolved.pet_type,
        resolved.owner,
    );
    clinic.save_pet(&mut pet).await?;

    if let Some(id) = pet.id {
        tracing::Span::current()
            .record("pet_id", id)
            .record("business_event", "Pet created");
    }
    metrics::pet_created();

    Ok((StatusCode::NO_CONTENT, Json(mapper::to_pet_dto(&pet))).into_response())
}

// PUT /api/pets/:pet_id
// The owner is never reassigned; only name, birth date and type change.
pub async fn update_pet(
    Extension(clinic): Extension<SharedClinicService>,
    Path(pet_id): Path<i32>,
    payload: Result<Json<PetDto>, JsonRejection>,
) -> Result<Response, ApiError> {
    record_action("update_pet");
    tracing::Span::current().record("pet_id", pet_id);

    let resolved = resolve_payload(clinic.as_ref(), payload).await?;
    let mut pet = clinic
        .find_pet_by_id(pet_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    pet.birth_date = resolved.birth_date;
    pet.name = resolved.name;
    pet.pet_type = resolved.pet_type;
    clinic.save_pet(&mut pet).await?;

    tracing::Span::current().record("business_event", "Pet updated");
    metrics::pet_updated();

    Ok((StatusCode::NO_CONTENT, Json(mapper::to_pet_dto(&pet))).into_response())
}

// DELETE /api/pets/:pet_id
pub async fn delete_pet(
    Extension(clinic): Extension<SharedClinicService>,
    Path(pet_id): Path<i32>,
) -> Result<Response, ApiError> {
    record_action("delete_pet");
    tracing::Span::current().record("pet_id", pet_id);

    let pet = clinic
        .find_pet_by_id(pet_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    clinic.delete_pet(&pet).await?;

    tracing::Span::current().record("business_event", "Pet deleted");
    metrics::pet_deleted();

    Ok(StatusCode::NO_CONTENT.into_response())
}
