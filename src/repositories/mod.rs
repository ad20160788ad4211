mod movies;
mod ratings;

pub use movies::MovieRepository;
pub use ratings::RatingRepository;

/// Average of the given ratings rounded to one decimal place.
pub(crate) fn average(ratings: &[i32]) -> Option<f32> {
    if ratings.is_empty() {
        return None;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let avg = sum as f64 / ratings.len() as f64;
    Some(((avg * 10.0).round() / 10.0) as f32)
}
