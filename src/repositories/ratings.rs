use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    entities::{movie, rating},
    error::AppResult,
    models::MovieRating,
};

#[derive(Clone)]
pub struct RatingRepository {
    db: DatabaseConnection,
}

impl RatingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn rate_movie(&self, movie_id: Uuid, rating: i32, user_id: Uuid) -> AppResult<bool> {
        let model = rating::ActiveModel {
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            rating: Set(rating),
        };

        let affected = rating::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([rating::Column::UserId, rating::Column::MovieId])
                    .update_column(rating::Column::Rating)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(affected > 0)
    }

    pub async fn get_rating(&self, movie_id: Uuid) -> AppResult<Option<f32>> {
        let ratings = self.ratings_for_movie(movie_id).await?;
        Ok(super::average(&ratings.iter().map(|r| r.rating).collect::<Vec<_>>()))
    }

    /// Aggregate rating plus the given user's own rating, if any.
    pub async fn get_rating_for_user(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<(Option<f32>, Option<i32>)> {
        let ratings = self.ratings_for_movie(movie_id).await?;
        let own = ratings.iter().find(|r| r.user_id == user_id).map(|r| r.rating);
        let average = super::average(&ratings.iter().map(|r| r.rating).collect::<Vec<_>>());
        Ok((average, own))
    }

    pub async fn delete_rating(&self, movie_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = rating::Entity::delete_many()
            .filter(rating::Column::MovieId.eq(movie_id))
            .filter(rating::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get_ratings_for_user(&self, user_id: Uuid) -> AppResult<Vec<MovieRating>> {
        let rows = rating::Entity::find()
            .filter(rating::Column::UserId.eq(user_id))
            .find_also_related(movie::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(rating, movie)| {
                movie.map(|m| MovieRating {
                    movie_id: rating.movie_id,
                    slug: m.slug,
                    rating: rating.rating,
                })
            })
            .collect())
    }

    async fn ratings_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<rating::Model>> {
        Ok(rating::Entity::find().filter(rating::Column::MovieId.eq(movie_id)).all(&self.db).await?)
    }
}
