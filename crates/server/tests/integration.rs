use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::http::StatusCode;
use axum_test::TestServer;
use marquee_core::config::Config;
use marquee_core::types::ContentKind;
use marquee_metadata::aggregate::Aggregator;
use marquee_metadata::extras::ExtrasCache;
use marquee_metadata::provider::{HomeSection, MetadataProvider, TextGenerator, VideoProvider};
use marquee_metadata::tmdb::{
    TmdbCastEntry, TmdbCredits, TmdbCrewEntry, TmdbListItem, TmdbOffer, TmdbRegionProviders,
    TmdbTitle, TmdbWatchProviders,
};
use marquee_metadata::upstream::Provider;
use marquee_metadata::{MetadataError, VideoLink};
use marquee_server::routes::build_router;
use marquee_server::state::AppState;
use serde_json::Value;

/// Known ids: `550` exists, `404` is unknown upstream, `500` makes the
/// provider fail, `777` exists but has no streaming data.
struct FakeTmdb {
    discover_down: bool,
}

fn check(id: &str) -> Result<(), MetadataError> {
    match id {
        "404" => Err(MetadataError::NotFound),
        "500" => Err(MetadataError::Status {
            provider: Provider::Tmdb,
            status: 500,
            body: "internal".into(),
        }),
        _ => Ok(()),
    }
}

#[async_trait::async_trait]
impl MetadataProvider for FakeTmdb {
    fn name(&self) -> &str {
        "fake"
    }

    async fn details(&self, _kind: ContentKind, id: &str) -> Result<TmdbTitle, MetadataError> {
        check(id)?;
        Ok(TmdbTitle {
            id: id.parse().unwrap_or(0),
            title: Some("Fight Club".into()),
            release_date: Some("1999-10-15".into()),
            vote_average: Some(8.4),
            poster_path: Some("/fc.jpg".into()),
            budget: Some(63_000_000),
            revenue: Some(0),
            ..Default::default()
        })
    }

    async fn credits(&self, _kind: ContentKind, id: &str) -> Result<TmdbCredits, MetadataError> {
        check(id)?;
        Ok(TmdbCredits {
            cast: (0..14)
                .map(|i| TmdbCastEntry {
                    id: i,
                    name: format!("Actor {i}"),
                    character: Some(format!("Role {i}")),
                    profile_path: (i % 2 == 0).then(|| format!("/a{i}.jpg")),
                })
                .collect(),
            crew: vec![
                TmdbCrewEntry {
                    name: "David Fincher".into(),
                    job: Some("Director".into()),
                    ..Default::default()
                },
                TmdbCrewEntry {
                    name: "Jim Uhls".into(),
                    job: Some("Screenplay".into()),
                    ..Default::default()
                },
            ],
        })
    }

    async fn watch_providers(
        &self,
        _kind: ContentKind,
        id: &str,
    ) -> Result<TmdbWatchProviders, MetadataError> {
        check(id)?;
        let mut providers = TmdbWatchProviders::default();
        if id != "777" {
            providers.results.insert(
                "IN".into(),
                TmdbRegionProviders {
                    link: Some("https://www.themoviedb.org/movie/550/watch?locale=IN".into()),
                    rent: vec![TmdbOffer {
                        provider_id: 10,
                        provider_name: "Amazon Video".into(),
                        logo_path: Some("/amz.jpg".into()),
                    }],
                    ..Default::default()
                },
            );
        }
        Ok(providers)
    }

    async fn recommendations(
        &self,
        _kind: ContentKind,
        _id: &str,
    ) -> Result<Vec<TmdbListItem>, MetadataError> {
        // Enrichment failure: the detail page must still render.
        Err(MetadataError::Network {
            provider: Provider::Tmdb,
            message: "connection reset".into(),
        })
    }

    async fn discover(&self, _section: HomeSection) -> Result<Vec<TmdbListItem>, MetadataError> {
        if self.discover_down {
            return Err(MetadataError::Status {
                provider: Provider::Tmdb,
                status: 503,
                body: "down".into(),
            });
        }
        Ok((1..=3)
            .map(|i| TmdbListItem {
                id: i,
                name: Some(format!("Show {i}")),
                ..Default::default()
            })
            .collect())
    }
}

struct FakeVideos {
    keyless: bool,
    playlist_calls: AtomicUsize,
}

#[async_trait::async_trait]
impl VideoProvider for FakeVideos {
    async fn find_trailer(
        &self,
        title: &str,
        _year: Option<i32>,
    ) -> Result<Option<VideoLink>, MetadataError> {
        if title == "nothing" {
            return Ok(None);
        }
        if self.keyless {
            return Ok(Some(VideoLink::SearchFallback {
                search_url: "https://www.youtube.com/results?search_query=Fight%20Club".into(),
            }));
        }
        Ok(Some(VideoLink::Resolved {
            id: "SUXWAEX2jlg".into(),
            embed_url: "https://www.youtube.com/embed/SUXWAEX2jlg".into(),
            title: Some("Fight Club | Official Trailer".into()),
            thumbnail_url: Some("https://i.ytimg.com/vi/SUXWAEX2jlg/hqdefault.jpg".into()),
        }))
    }

    async fn find_songs_playlist(
        &self,
        _title: &str,
        _year: Option<i32>,
    ) -> Result<Option<VideoLink>, MetadataError> {
        self.playlist_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(VideoLink::Resolved {
            id: "PLfc".into(),
            embed_url: "https://www.youtube.com/embed/videoseries?list=PLfc".into(),
            title: None,
            thumbnail_url: None,
        }))
    }
}

struct FakeWriter {
    reply: &'static str,
}

#[async_trait::async_trait]
impl TextGenerator for FakeWriter {
    async fn generate(&self, prompt: &str) -> Result<String, MetadataError> {
        assert!(prompt.contains("- Title: Fight Club"));
        if self.reply.trim().is_empty() {
            return Err(MetadataError::Empty(Provider::Gemini));
        }
        Ok(self.reply.to_string())
    }
}

struct TestApp {
    server: TestServer,
    videos: Arc<FakeVideos>,
}

struct Options {
    discover_down: bool,
    keyless: bool,
    writer: Option<&'static str>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            discover_down: false,
            keyless: false,
            writer: Some("# Fight Club review"),
        }
    }
}

/// Create a test server with an in-memory SQLite database and fake providers.
async fn test_app_with(opts: Options) -> TestApp {
    let pool = marquee_db::connect(":memory:").await.unwrap();
    marquee_db::migrate::run(&pool).await.unwrap();

    let config =
        Config::from_lookup(|key| (key == "TMDB_API_KEY").then(|| "test-key".to_string()))
            .unwrap();
    let videos = Arc::new(FakeVideos {
        keyless: opts.keyless,
        playlist_calls: AtomicUsize::new(0),
    });
    let aggregator = Aggregator::new(
        &config,
        Arc::new(FakeTmdb {
            discover_down: opts.discover_down,
        }),
        videos.clone(),
        ExtrasCache::from_pool(pool),
    );
    let writer = opts
        .writer
        .map(|reply| Arc::new(FakeWriter { reply }) as Arc<dyn TextGenerator>);

    let state = AppState::new(Arc::new(aggregator), writer);
    TestApp {
        server: TestServer::new(build_router(state)).unwrap(),
        videos,
    }
}

async fn test_app() -> TestServer {
    test_app_with(Options::default()).await.server
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let server = test_app().await;
    let resp = server.get("/health").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn movie_detail_combines_all_sources() {
    let app = test_app_with(Options::default()).await;
    let resp = app.server.get("/api/movie/550").await;
    resp.assert_status_ok();
    let body: Value = resp.json();

    assert_eq!(body["id"], 550);
    assert_eq!(body["title"], "Fight Club");
    assert_eq!(body["posterUrl"], "https://image.tmdb.org/t/p/w500/fc.jpg");
    assert_eq!(body["budget"], "$63.0M");
    assert!(body["revenue"].is_null());
    assert_eq!(body["cast"].as_array().unwrap().len(), 12);
    assert!(body["cast"][1]["profileUrl"].is_null());
    assert_eq!(body["directors"][0], "David Fincher");
    assert_eq!(body["writers"][0], "Jim Uhls");
    assert_eq!(body["streaming"][0]["platform"], "Amazon Video");
    assert_eq!(body["streaming"][0]["kind"], "rent");
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 0);
    assert_eq!(
        body["songsPlaylistUrl"],
        "https://www.youtube.com/embed/videoseries?list=PLfc"
    );

    // Served from the extras store the second time around.
    app.server.get("/api/movie/550").await.assert_status_ok();
    assert_eq!(app.videos.playlist_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_movie_is_not_found() {
    let server = test_app().await;
    let resp = server.get("/api/movie/404").await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn upstream_failure_mirrors_provider_status() {
    let server = test_app().await;
    let resp = server.get("/api/movie/500").await;
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "upstream_unavailable");
    assert_eq!(body["error"]["details"]["upstream_status"], 500);
}

#[tokio::test]
async fn home_feed_returns_four_lists() {
    let server = test_app().await;
    let resp = server.get("/api/home").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    for key in ["trending", "webSeries", "topRated", "upcoming"] {
        assert_eq!(body[key].as_array().unwrap().len(), 3, "{key}");
    }
    assert_eq!(body["webSeries"][0]["title"], "Show 1");
}

#[tokio::test]
async fn home_feed_fails_when_every_list_fails() {
    let server = test_app_with(Options {
        discover_down: true,
        ..Default::default()
    })
    .await
    .server;
    let resp = server.get("/api/home").await;
    resp.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "upstream_unavailable");
}

#[tokio::test]
async fn ott_lookup_returns_region_platforms() {
    let server = test_app().await;
    let resp = server.get("/api/ott/tv/550").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["country"], "IN");
    assert_eq!(body["platforms"][0]["platform"], "Amazon Video");
    assert_eq!(
        body["platforms"][0]["logoUrl"],
        "https://image.tmdb.org/t/p/w92/amz.jpg"
    );
    assert!(body["tmdbLink"].as_str().is_some());
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn ott_lookup_explains_empty_region() {
    let server = test_app().await;
    let resp = server.get("/api/ott/movie/777").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["platforms"].as_array().unwrap().len(), 0);
    assert!(body["message"].as_str().unwrap().contains("IN"));
}

#[tokio::test]
async fn ott_lookup_rejects_unknown_kind() {
    let server = test_app().await;
    let resp = server.get("/api/ott/anime/550").await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn trailer_resolves_video() {
    let server = test_app().await;
    let resp = server
        .get("/api/trailer/Fight%20Club")
        .add_query_param("year", 1999)
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["mode"], "api");
    assert_eq!(body["videoId"], "SUXWAEX2jlg");
    assert_eq!(body["embedUrl"], "https://www.youtube.com/embed/SUXWAEX2jlg");
    assert!(body["thumbnailUrl"].as_str().is_some());
    assert!(body.get("searchUrl").is_none());
}

#[tokio::test]
async fn trailer_without_key_returns_search_link() {
    let server = test_app_with(Options {
        keyless: true,
        ..Default::default()
    })
    .await
    .server;
    let resp = server.get("/api/trailer/Fight%20Club").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["mode"], "fallback");
    assert_eq!(body["title"], "Fight Club");
    assert!(body["searchUrl"].as_str().unwrap().contains("search_query="));
    assert!(body.get("videoId").is_none());
}

#[tokio::test]
async fn trailer_rejects_malformed_year_with_error_envelope() {
    let server = test_app().await;
    let resp = server.get("/api/trailer/RRR?year=abc").await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["error"]["message"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn upstream_error_message_omits_provider_body() {
    let server = test_app().await;
    let resp = server.get("/api/movie/500").await;
    let body: Value = resp.json();
    assert_eq!(body["error"]["message"], "upstream unavailable: TMDB returned 500");
}

#[tokio::test]
async fn trailer_with_no_hit_is_not_found() {
    let server = test_app().await;
    server
        .get("/api/trailer/nothing")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blog_generates_review() {
    let server = test_app().await;
    let resp = server.get("/api/movie/550/blog").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["movieId"], 550);
    assert_eq!(body["title"], "Fight Club");
    assert_eq!(body["blog"], "# Fight Club review");
}

#[tokio::test]
async fn blog_without_writer_is_configuration_error() {
    let server = test_app_with(Options {
        writer: None,
        ..Default::default()
    })
    .await
    .server;
    let resp = server.get("/api/movie/550/blog").await;
    resp.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "configuration_error");
}

#[tokio::test]
async fn blog_with_empty_text_is_upstream_error() {
    let server = test_app_with(Options {
        writer: Some("   "),
        ..Default::default()
    })
    .await
    .server;
    let resp = server.get("/api/movie/550/blog").await;
    resp.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "upstream_unavailable");
}

#[tokio::test]
async fn blog_for_unknown_movie_is_not_found() {
    let server = test_app().await;
    server
        .get("/api/movie/404/blog")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn warmup_reports_feed_outcome() {
    let pool = marquee_db::connect(":memory:").await.unwrap();
    marquee_db::migrate::run(&pool).await.unwrap();
    let config =
        Config::from_lookup(|key| (key == "TMDB_API_KEY").then(|| "test-key".to_string()))
            .unwrap();
    let videos = Arc::new(FakeVideos {
        keyless: true,
        playlist_calls: AtomicUsize::new(0),
    });

    let healthy = Aggregator::new(
        &config,
        Arc::new(FakeTmdb {
            discover_down: false,
        }),
        videos.clone(),
        ExtrasCache::from_pool(pool.clone()),
    );
    assert!(marquee_server::warmup::run_once(&healthy).await);

    let down = Aggregator::new(
        &config,
        Arc::new(FakeTmdb {
            discover_down: true,
        }),
        videos,
        ExtrasCache::from_pool(pool),
    );
    assert!(!marquee_server::warmup::run_once(&down).await);
}
