mod common;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use common::{member_token, spawn_app};
use movies_api::{
    contracts::{CreateMovieRequest, GetAllMoviesRequest, UpdateMovieRequest},
    sdk::{AuthTokenProvider, MoviesApiClient, TokenFetcher},
    versioning::ApiVersion,
};
use uuid::Uuid;

struct StaticFetcher {
    user: Uuid,
    calls: Arc<AtomicUsize>,
}

impl TokenFetcher for StaticFetcher {
    async fn fetch(&self) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(member_token(self.user))
    }
}

#[tokio::test]
async fn client_drives_every_operation() {
    let app = spawn_app().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move { axum::serve(listener, router).await });

    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = StaticFetcher { user: Uuid::new_v4(), calls: calls.clone() };
    let tokens = Arc::new(AuthTokenProvider::new(fetcher));
    let client = MoviesApiClient::new(reqwest::Client::new(), &format!("http://{addr}"), tokens)
        .with_version(ApiVersion::V2);

    let created = client
        .create_movie(&CreateMovieRequest {
            title: "Heat".into(),
            year_of_release: 1995,
            genres: vec!["Crime".into()],
        })
        .await
        .unwrap();
    assert_eq!(created.slug, "heat-1995");

    let fetched = client.get_movie("heat-1995").await.unwrap();
    assert_eq!(fetched.id, created.id);

    let updated = client
        .update_movie(
            created.id,
            &UpdateMovieRequest {
                title: "Heat".into(),
                year_of_release: 1995,
                genres: vec!["Thriller".into()],
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.genres, vec!["Thriller".to_string()]);

    client.rate_movie(created.id, 5).await.unwrap();
    let mine = client.get_user_ratings().await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].rating, 5);

    let page = client
        .get_movies(&GetAllMoviesRequest { title: Some("heat".into()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].user_rating, Some(5));

    client.delete_rating(created.id).await.unwrap();
    assert!(client.delete_rating(created.id).await.is_err());

    // Trusted members may not delete movies.
    assert!(client.delete_movie(created.id).await.is_err());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
