pub mod aggregate;
pub mod extras;
pub mod gemini;
pub mod payload;
pub mod provider;
pub mod tmdb;
pub mod upstream;
pub mod youtube;

use marquee_core::types::OfferKind;
use serde::Serialize;
use thiserror::Error;

use crate::upstream::Provider;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: Provider,
        status: u16,
        body: String,
    },
    #[error("network error talking to {provider}: {message}")]
    Network { provider: Provider, message: String },
    #[error("could not parse {provider} response: {message}")]
    Decode { provider: Provider, message: String },
    #[error("{0} returned no usable content")]
    Empty(Provider),
    #[error("not found")]
    NotFound,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} is not configured")]
    NotConfigured(Provider),
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),
}

/// The combined movie page payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<i32>,
    pub vote_average: Option<f64>,
    pub genres: Vec<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    /// Compact display amounts such as `$1.5B`.
    pub budget: Option<String>,
    pub revenue: Option<String>,
    pub cast: Vec<CastMember>,
    pub directors: Vec<String>,
    pub writers: Vec<String>,
    pub producers: Vec<String>,
    pub streaming: Vec<StreamingOffer>,
    pub recommendations: Vec<MediaCard>,
    pub songs_playlist_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    pub character: Option<String>,
    pub profile_url: Option<String>,
}

/// Director, writer and producer names filtered out of a crew list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrewRoles {
    pub directors: Vec<String>,
    pub writers: Vec<String>,
    pub producers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingOffer {
    pub platform: String,
    pub logo_url: Option<String>,
    pub kind: OfferKind,
}

/// Watch-provider availability for the configured region.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionOffers {
    pub country: String,
    pub platforms: Vec<StreamingOffer>,
    pub tmdb_link: Option<String>,
}

/// Compact title card used by the home feed and recommendations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCard {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeFeed {
    pub trending: Vec<MediaCard>,
    pub web_series: Vec<MediaCard>,
    pub top_rated: Vec<MediaCard>,
    pub upcoming: Vec<MediaCard>,
}

/// A trailer or playlist resolved by the video provider.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoLink {
    Resolved {
        id: String,
        embed_url: String,
        title: Option<String>,
        thumbnail_url: Option<String>,
    },
    /// No credential configured: a plain search-results link instead.
    SearchFallback { search_url: String },
}

impl VideoLink {
    pub fn url(&self) -> &str {
        match self {
            Self::Resolved { embed_url, .. } => embed_url,
            Self::SearchFallback { search_url } => search_url,
        }
    }
}
