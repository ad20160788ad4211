use std::collections::HashMap;

use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::{Expr, LikeExpr, Order},
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    entities::{genre, movie, rating},
    error::AppResult,
    models::{GetAllMoviesOptions, Movie, SortField, SortOrder},
    validation::ValidationErrors,
};

#[derive(Clone)]
pub struct MovieRepository {
    db: DatabaseConnection,
}

impl MovieRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, movie: &Movie) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        let model = movie::ActiveModel {
            id: Set(movie.id),
            slug: Set(movie.slug()),
            title: Set(movie.title.clone()),
            year_of_release: Set(movie.year_of_release),
        };
        let inserted = movie::Entity::insert(model).exec_without_returning(&txn).await? > 0;

        if inserted {
            insert_genres(&txn, movie).await?;
        }

        txn.commit().await?;
        debug!(movie_id = %movie.id, inserted, "created movie");
        Ok(inserted)
    }

    pub async fn update(&self, movie: &Movie) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        let result = movie::Entity::update_many()
            .col_expr(movie::Column::Slug, Expr::value(movie.slug()))
            .col_expr(movie::Column::Title, Expr::value(movie.title.clone()))
            .col_expr(movie::Column::YearOfRelease, Expr::value(movie.year_of_release))
            .filter(movie::Column::Id.eq(movie.id))
            .exec(&txn)
            .await?;
        let updated = result.rows_affected > 0;

        if updated {
            genre::Entity::delete_many()
                .filter(genre::Column::MovieId.eq(movie.id))
                .exec(&txn)
                .await?;
            insert_genres(&txn, movie).await?;
        }

        txn.commit().await?;
        debug!(movie_id = %movie.id, updated, "updated movie");
        Ok(updated)
    }

    pub async fn get_by_id(&self, id: Uuid, user_id: Option<Uuid>) -> AppResult<Option<Movie>> {
        let Some(model) = movie::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![model], user_id).await?.pop())
    }

    pub async fn get_by_slug(&self, slug: &str, user_id: Option<Uuid>) -> AppResult<Option<Movie>> {
        let Some(model) =
            movie::Entity::find().filter(movie::Column::Slug.eq(slug)).one(&self.db).await?
        else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![model], user_id).await?.pop())
    }

    pub async fn get_all(&self, options: &GetAllMoviesOptions) -> AppResult<Vec<Movie>> {
        let mut query = movie::Entity::find()
            .filter(filter_condition(options.title.as_deref(), options.year_of_release));

        if options.sort_field.is_some() {
            let Some((field, order)) = options.sort() else {
                return Err(ValidationErrors::single(
                    "sortBy",
                    "You can only sort by 'title' or 'year-of-release'",
                )
                .into());
            };
            let column = match field {
                SortField::Title => movie::Column::Title,
                SortField::YearOfRelease => movie::Column::YearOfRelease,
            };
            let order = match order {
                SortOrder::Descending => Order::Desc,
                SortOrder::Ascending | SortOrder::Unsorted => Order::Asc,
            };
            query = query.order_by(column, order);
        }

        let page_size = options.page_size.max(1) as u64;
        let offset = (options.page.max(1) as u64 - 1).saturating_mul(page_size);

        let models = query
            .order_by_asc(movie::Column::Id)
            .offset(offset)
            .limit(page_size)
            .all(&self.db)
            .await?;

        debug!(count = models.len(), offset, page_size, "fetched movies page");
        self.hydrate(models, options.user_id).await
    }

    pub async fn count(&self, title: Option<&str>, year_of_release: Option<i32>) -> AppResult<u64> {
        let total = movie::Entity::find()
            .filter(filter_condition(title, year_of_release))
            .count(&self.db)
            .await?;
        Ok(total)
    }

    pub async fn delete_by_id(&self, id: Uuid) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        genre::Entity::delete_many().filter(genre::Column::MovieId.eq(id)).exec(&txn).await?;
        rating::Entity::delete_many().filter(rating::Column::MovieId.eq(id)).exec(&txn).await?;
        let result = movie::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn exists_by_id(&self, id: Uuid) -> AppResult<bool> {
        Ok(movie::Entity::find_by_id(id).count(&self.db).await? > 0)
    }

    /// Attaches ordered genres, the aggregate rating and the caller's own rating.
    async fn hydrate(
        &self,
        models: Vec<movie::Model>,
        user_id: Option<Uuid>,
    ) -> AppResult<Vec<Movie>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();

        let genre_rows = genre::Entity::find()
            .filter(genre::Column::MovieId.is_in(ids.clone()))
            .order_by_asc(genre::Column::Position)
            .all(&self.db)
            .await?;
        let rating_rows =
            rating::Entity::find().filter(rating::Column::MovieId.is_in(ids)).all(&self.db).await?;

        let mut genres: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in genre_rows {
            genres.entry(row.movie_id).or_default().push(row.name);
        }

        let mut ratings: HashMap<Uuid, Vec<i32>> = HashMap::new();
        let mut own: HashMap<Uuid, i32> = HashMap::new();
        for row in rating_rows {
            if Some(row.user_id) == user_id {
                own.insert(row.movie_id, row.rating);
            }
            ratings.entry(row.movie_id).or_default().push(row.rating);
        }

        Ok(models
            .into_iter()
            .map(|m| Movie {
                rating: ratings.get(&m.id).and_then(|r| super::average(r)),
                user_rating: own.get(&m.id).copied(),
                genres: genres.remove(&m.id).unwrap_or_default(),
                id: m.id,
                title: m.title,
                year_of_release: m.year_of_release,
            })
            .collect())
    }
}

fn filter_condition(title: Option<&str>, year_of_release: Option<i32>) -> Condition {
    Condition::all()
        .add_option(title.filter(|t| !t.is_empty()).map(|t| {
            Expr::col(movie::Column::Title)
                .like(LikeExpr::new(format!("%{}%", escape_like(t))).escape(LIKE_ESCAPE))
        }))
        .add_option(year_of_release.map(|y| movie::Column::YearOfRelease.eq(y)))
}

/// Escape character for title patterns; needs no quoting on any backend.
const LIKE_ESCAPE: char = '!';

/// Makes `%`, `_` and the escape character match literally inside a `LIKE` pattern.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

async fn insert_genres<C: ConnectionTrait>(db: &C, movie: &Movie) -> AppResult<()> {
    if movie.genres.is_empty() {
        return Ok(());
    }
    let rows = movie.genres.iter().enumerate().map(|(position, name)| genre::ActiveModel {
        movie_id: Set(movie.id),
        position: Set(position as i32),
        name: Set(name.clone()),
    });
    genre::Entity::insert_many(rows).exec_without_returning(db).await?;
    Ok(())
}
