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
                    .table(Genres::Table)
                    .if_not_exists()
                    .col(uuid(Genres::MovieId))
                    .col(integer(Genres::Position))
                    .col(string(Genres::Name))
                    .primary_key(Index::create().col(Genres::MovieId).col(Genres::Position))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_genres_movie_id")
                            .from(Genres::Table, Genres::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Genres::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Genres {
    Table,
    MovieId,
    Position,
    Name,
}
