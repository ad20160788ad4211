use sea_orm_migration::{prelude::*, schema::*};

use crate::m20230725_075100_create_movies_table::Movies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(uuid(Ratings::UserId))
                    .col(uuid(Ratings::MovieId))
                    .col(integer(Ratings::Rating))
                    .primary_key(Index::create().col(Ratings::UserId).col(Ratings::MovieId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ratings_movie_id")
                            .from(Ratings::Table, Ratings::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_movie_id")
                    .table(Ratings::Table)
                    .col(Ratings::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Ratings::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Ratings {
    Table,
    UserId,
    MovieId,
    Rating,
}
