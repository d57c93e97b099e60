use sea_orm_migration::prelude::*;

mod m20240101_000001_create_clinic_tables;
mod m20240101_000002_create_security_tables;
mod m20240101_000003_seed_pet_types;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_clinic_tables::Migration),
            Box::new(m20240101_000002_create_security_tables::Migration),
            Box::new(m20240101_000003_seed_pet_types::Migration),
        ]
    }
}
