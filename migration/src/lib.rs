pub use sea_orm_migration::prelude::*;

mod m20230725_075100_create_movies_table;
mod m20230807_151000_create_movies_slug_index;
mod m20230807_162500_create_genres_table;
mod m20231006_052500_create_ratings_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20230725_075100_create_movies_table::Migration),
            Box::new(m20230807_151000_create_movies_slug_index::Migration),
            Box::new(m20230807_162500_create_genres_table::Migration),
            Box::new(m20231006_052500_create_ratings_table::Migration),
        ]
    }
}
