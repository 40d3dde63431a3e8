use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use marquee_core::error::ApiError;
use marquee_core::types::ContentKind;
use marquee_metadata::gemini::review_prompt;
use marquee_metadata::upstream::Provider;
use marquee_metadata::{HomeFeed, MetadataError, MovieDetail, RegionOffers, VideoLink};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/home", get(home_feed))
        // Titles
        .route("/movie/{id}", get(movie_detail))
        .route("/movie/{id}/blog", get(movie_blog))
        .route("/ott/{kind}/{id}", get(ott_lookup))
        // Videos
        .route("/trailer/{title}", get(trailer))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("database check failed: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

async fn home_feed(State(state): State<AppState>) -> Result<Json<HomeFeed>, AppError> {
    Ok(Json(state.aggregator.home_feed().await?))
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

async fn movie_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MovieDetail>, AppError> {
    Ok(Json(state.aggregator.movie_detail(&id).await?))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlogResponse {
    movie_id: i64,
    title: String,
    blog: String,
}

async fn movie_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlogResponse>, AppError> {
    let writer = state
        .writer
        .as_ref()
        .ok_or(MetadataError::NotConfigured(Provider::Gemini))?;

    let ctx = state.aggregator.review_context(&id).await?;
    let prompt = review_prompt(&ctx, state.aggregator.region());
    let blog = writer.generate(&prompt).await?;
    info!(movie_id = ctx.tmdb_id, chars = blog.len(), "review generated");

    Ok(Json(BlogResponse {
        movie_id: ctx.tmdb_id,
        title: ctx.title,
        blog,
    }))
}

#[derive(Serialize)]
struct OttResponse {
    #[serde(flatten)]
    offers: RegionOffers,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

async fn ott_lookup(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<OttResponse>, AppError> {
    let kind = ContentKind::parse(&kind).ok_or_else(|| {
        ApiError::BadRequest(format!("kind must be movie or tv, got {kind:?}"))
    })?;

    let offers = state.aggregator.region_offers(kind, &id).await?;
    let message = offers
        .platforms
        .is_empty()
        .then(|| format!("no streaming platforms listed for {}", offers.country));

    Ok(Json(OttResponse { offers, message }))
}

// ---------------------------------------------------------------------------
// Videos
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TrailerQuery {
    /// Kept as text so a malformed year gets the JSON error envelope.
    year: Option<String>,
}

impl TrailerQuery {
    fn year(&self) -> Result<Option<i32>, ApiError> {
        match self.year.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                ApiError::BadRequest(format!("year must be a number, got {raw:?}"))
            }),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrailerResponse {
    title: String,
    mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    embed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_url: Option<String>,
}

async fn trailer(
    State(state): State<AppState>,
    Path(title): Path<String>,
    Query(query): Query<TrailerQuery>,
) -> Result<Json<TrailerResponse>, AppError> {
    if title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".into()).into());
    }
    let year = query.year()?;

    let link = state
        .aggregator
        .trailer(&title, year)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no trailer found for {title:?}")))?;

    let resp = match link {
        VideoLink::Resolved {
            id,
            embed_url,
            title: video_title,
            thumbnail_url,
        } => TrailerResponse {
            title: video_title.unwrap_or(title),
            mode: "api",
            video_id: Some(id),
            embed_url: Some(embed_url),
            thumbnail_url,
            search_url: None,
        },
        VideoLink::SearchFallback { search_url } => TrailerResponse {
            title,
            mode: "fallback",
            video_id: None,
            embed_url: None,
            thumbnail_url: None,
            search_url: Some(search_url),
        },
    };
    Ok(Json(resp))
}
