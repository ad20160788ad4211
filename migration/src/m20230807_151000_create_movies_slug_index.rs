use sea_orm_migration::prelude::*;

use crate::m20230725_075100_create_movies_table::Movies;

const SLUG_INDEX: &str = "movies_slug_idx";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name(SLUG_INDEX)
                    .table(Movies::Table)
                    .col(Movies::Slug)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(SLUG_INDEX).table(Movies::Table).to_owned())
            .await
    }
}
