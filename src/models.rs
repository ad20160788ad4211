use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub year_of_release: i32,
    pub genres: Vec<String>,
    pub rating: Option<f32>,
    pub user_rating: Option<i32>,
}

impl Movie {
    pub fn new(
        id: Uuid,
        title: impl Into<String>,
        year_of_release: i32,
        genres: Vec<String>,
    ) -> Self {
        Self { id, title: title.into(), year_of_release, genres, rating: None, user_rating: None }
    }

    pub fn slug(&self) -> String {
        slugify(&self.title, self.year_of_release)
    }
}

/// Keeps `[0-9A-Za-z _-]`, lowercases, turns spaces into hyphens and appends the year.
pub fn slugify(title: &str, year_of_release: i32) -> String {
    let slugged: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .map(|c| if c == ' ' { '-' } else { c.to_ascii_lowercase() })
        .collect();
    format!("{slugged}-{year_of_release}")
}

#[derive(Clone, Debug, PartialEq)]
pub struct MovieRating {
    pub movie_id: Uuid,
    pub slug: String,
    pub rating: i32,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortOrder {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortField {
    Title,
    YearOfRelease,
}

impl SortField {
    pub const ACCEPTED: [&'static str; 2] = ["title", "year_of_release"];

    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("title") {
            Some(SortField::Title)
        } else if name.eq_ignore_ascii_case("year_of_release") {
            Some(SortField::YearOfRelease)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GetAllMoviesOptions {
    pub title: Option<String>,
    pub year_of_release: Option<i32>,
    pub sort_field: Option<String>,
    pub sort_order: SortOrder,
    pub page: i64,
    pub page_size: i64,
    pub user_id: Option<Uuid>,
}

impl GetAllMoviesOptions {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_PAGE_SIZE: i64 = 10;

    /// Sort column, if the requested field is on the allow-list.
    pub fn sort(&self) -> Option<(SortField, SortOrder)> {
        let field = SortField::from_name(self.sort_field.as_deref()?)?;
        Some((field, self.sort_order))
    }
}

impl Default for GetAllMoviesOptions {
    fn default() -> Self {
        Self {
            title: None,
            year_of_release: None,
            sort_field: None,
            sort_order: SortOrder::Unsorted,
            page: Self::DEFAULT_PAGE,
            page_size: Self::DEFAULT_PAGE_SIZE,
            user_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Nick the Greek", 2023, "nick-the-greek-2023")]
    #[case("Pulp Fiction!", 1994, "pulp-fiction-1994")]
    #[case("Spider-Man: No Way Home", 2021, "spider-man-no-way-home-2021")]
    #[case("Amélie", 2001, "amlie-2001")]
    #[case("snake_case", 2000, "snake_case-2000")]
    fn slug_strips_and_lowercases(#[case] title: &str, #[case] year: i32, #[case] expected: &str) {
        assert_eq!(slugify(title, year), expected);
    }

    #[test]
    fn slug_only_contains_url_safe_characters() {
        let title = "  Weird *&^% Title (Director's Cut) ";
        let movie = Movie::new(Uuid::new_v4(), title, 1999, vec![]);
        let slug = movie.slug();
        assert!(slug.ends_with("-1999"));
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    }

    #[test]
    fn sort_requires_allowed_field() {
        let options = GetAllMoviesOptions {
            sort_field: Some("Year_Of_Release".into()),
            sort_order: SortOrder::Descending,
            ..Default::default()
        };
        assert_eq!(options.sort(), Some((SortField::YearOfRelease, SortOrder::Descending)));

        let options =
            GetAllMoviesOptions { sort_field: Some("id; drop".into()), ..Default::default() };
        assert_eq!(options.sort(), None);
    }
}
