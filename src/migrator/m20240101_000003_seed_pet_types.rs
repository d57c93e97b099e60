use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_clinic_tables::Types;

const PET_TYPES: [&str; 6] = ["cat", "dog", "lizard", "snake", "bird", "hamster"];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert.into_table(Types::Table).columns([Types::Name]);
        for name in PET_TYPES {
            insert.values_panic([name.into()]);
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Types::Table)
            .and_where(Expr::col(Types::Name).is_in(PET_TYPES))
            .to_owned();
        manager.exec_stmt(delete).await
    }
}
