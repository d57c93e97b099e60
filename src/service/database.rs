use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::ClinicService;
use crate::entities::{owner, pet, pet_type, visit};
use crate::error::ServiceError;
use crate::model::{Owner, Pet, PetType, Visit};

#[derive(Clone)]
pub struct SeaOrmClinicService {
    db: DatabaseConnection,
}

impl SeaOrmClinicService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn assemble(
        model: pet::Model,
        pet_type: PetType,
        owner: Owner,
        visits: Vec<Visit>,
    ) -> Pet {
        Pet {
            id: Some(model.id),
            name: model.name,
            birth_date: model.birth_date,
            pet_type,
            owner,
            visits,
        }
    }

    fn active_model(pet: &Pet) -> pet::ActiveModel {
        pet::ActiveModel {
            name: Set(pet.name.clone()),
            birth_date: Set(pet.birth_date),
            type_id: Set(pet.pet_type.id),
            owner_id: Set(pet.owner.id),
            ..Default::default()
        }
    }
}

fn dangling(pet_id: i32) -> ServiceError {
    ServiceError::Database(DbErr::RecordNotFound(format!(
        "pet {} references a missing owner or type",
        pet_id
    )))
}

#[async_trait]
impl ClinicService for SeaOrmClinicService {
    async fn find_pet_by_id(&self, id: i32) -> Result<Option<Pet>, ServiceError> {
        let Some(model) = pet::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let pet_type = pet_type::Entity::find_by_id(model.type_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| dangling(id))?;
        let owner = owner::Entity::find_by_id(model.owner_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| dangling(id))?;
        let visits = visit::Entity::find()
            .filter(visit::Column::PetId.eq(id))
            .order_by_asc(visit::Column::VisitDate)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Visit::from)
            .collect();

        Ok(Some(Self::assemble(
            model,
            pet_type.into(),
            owner.into(),
            visits,
        )))
    }

    async fn find_all_pets(&self) -> Result<Vec<Pet>, ServiceError> {
        let models = pet::Entity::find()
            .order_by_asc(pet::Column::Id)
            .all(&self.db)
            .await?;
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let pet_ids: Vec<i32> = models.iter().map(|p| p.id).collect();
        let owner_ids: HashSet<i32> = models.iter().map(|p| p.owner_id).collect();

        let pet_types: HashMap<i32, PetType> = pet_type::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|t| (t.id, PetType::from(t)))
            .collect();
        let owners: HashMap<i32, Owner> = owner::Entity::find()
            .filter(owner::Column::Id.is_in(owner_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|o| (o.id, Owner::from(o)))
            .collect();

        let mut visits: HashMap<i32, Vec<Visit>> = HashMap::new();
        for v in visit::Entity::find()
            .filter(visit::Column::PetId.is_in(pet_ids))
            .order_by_asc(visit::Column::VisitDate)
            .all(&self.db)
            .await?
        {
            visits.entry(v.pet_id).or_default().push(v.into());
        }

        models
            .into_iter()
            .map(|model| {
                let pet_type = pet_types
                    .get(&model.type_id)
                    .cloned()
                    .ok_or_else(|| dangling(model.id))?;
                let owner = owners
                    .get(&model.owner_id)
                    .cloned()
                    .ok_or_else(|| dangling(model.id))?;
                let pet_visits = visits.remove(&model.id).unwrap_or_default();
                Ok(Self::assemble(model, pet_type, owner, pet_visits))
            })
            .collect()
    }

    async fn find_pet_types(&self) -> Result<Vec<PetType>, ServiceError> {
        let types = pet_type::Entity::find()
            .order_by_asc(pet_type::Column::Name)
            .all(&self.db)
            .await?;
        Ok(types.into_iter().map(PetType::from).collect())
    }

    async fn find_pet_type_by_id(&self, id: i32) -> Result<Option<PetType>, ServiceError> {
        Ok(pet_type::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(PetType::from))
    }

    async fn find_owner_by_id(&self, id: i32) -> Result<Option<Owner>, ServiceError> {
        Ok(owner::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Owner::from))
    }

    async fn save_pet(&self, pet: &mut Pet) -> Result<(), ServiceError> {
        let mut active_pet = Self::active_model(pet);
        match pet.id {
            Some(id) => {
                active_pet.id = Set(id);
                active_pet.update(&self.db).await?;
            }
            None => {
                let inserted = active_pet.insert(&self.db).await?;
                pet.id = Some(inserted.id);
            }
        }
        Ok(())
    }

    async fn delete_pet(&self, pet: &Pet) -> Result<(), ServiceError> {
        let pet_id = pet.id.ok_or(ServiceError::Unsaved)?;
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    visit::Entity::delete_many()
                        .filter(visit::Column::PetId.eq(pet_id))
                        .exec(txn)
                        .await?;
                    pet::Entity::delete_by_id(pet_id).exec(txn).await?;
                    Ok(())
                })
            })
            .await?;
        Ok(())
    }
}
