//! TMDB (The Movie Database) provider client.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs

use std::collections::HashMap;

use chrono::NaiveDate;
use marquee_core::config::{Secret, TmdbConfig};
use marquee_core::types::ContentKind;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::MetadataError;
use crate::provider::{HomeSection, MetadataProvider};
use crate::upstream::{Provider, Upstream};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbTitle {
    pub id: i64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub runtime: Option<i32>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub genres: Vec<TmdbGenre>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
}

impl TmdbTitle {
    /// Movies carry `title`, series carry `name`.
    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub fn date(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
            .filter(|d| !d.is_empty())
    }

    pub fn year(&self) -> Option<i32> {
        self.date()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.genres.iter().map(|g| g.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbGenre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbCredits {
    pub cast: Vec<TmdbCastEntry>,
    pub crew: Vec<TmdbCrewEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbCastEntry {
    pub id: i64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbCrewEntry {
    pub id: i64,
    pub name: String,
    pub job: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbWatchProviders {
    /// Keyed by ISO 3166-1 region code.
    pub results: HashMap<String, TmdbRegionProviders>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbRegionProviders {
    pub link: Option<String>,
    pub flatrate: Vec<TmdbOffer>,
    pub rent: Vec<TmdbOffer>,
    pub buy: Vec<TmdbOffer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbOffer {
    pub provider_id: i64,
    pub provider_name: String,
    pub logo_path: Option<String>,
}

/// Entry of any paged list endpoint (discover, recommendations).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TmdbListItem {
    pub id: i64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct TmdbPage<T> {
    results: Vec<T>,
}

pub struct TmdbClient {
    api_key: Secret,
    language: String,
    region: String,
    upstream: Upstream,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig, region: &str, client: reqwest::Client) -> Self {
        Self {
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            region: region.to_string(),
            upstream: Upstream::new(Provider::Tmdb, &config.base_url, client),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, MetadataError> {
        let mut all_params = vec![
            ("api_key", self.api_key.expose()),
            ("language", self.language.as_str()),
        ];
        all_params.extend_from_slice(params);

        match self.upstream.get_json(path, &all_params).await {
            Err(MetadataError::Status { status: 404, .. }) => Err(MetadataError::NotFound),
            other => other,
        }
    }
}

/// `/{kind}/{id}{suffix}` with the caller-supplied id percent-encoded.
fn title_path(kind: ContentKind, id: &str, suffix: &str) -> String {
    format!("/{kind}/{}{suffix}", urlencoding::encode(id))
}

/// Endpoint and query for one home section.
pub fn discover_request(
    section: HomeSection,
    region: &str,
    today: NaiveDate,
) -> (&'static str, Vec<(&'static str, String)>) {
    let mut params = vec![
        ("with_origin_country", region.to_string()),
        ("include_adult", "false".to_string()),
        ("page", "1".to_string()),
    ];
    let path = match section {
        HomeSection::Trending => {
            params.push(("sort_by", "popularity.desc".into()));
            params.push(("vote_count.gte", "50".into()));
            "/discover/movie"
        }
        HomeSection::WebSeries => {
            params.push(("sort_by", "popularity.desc".into()));
            params.push(("vote_count.gte", "50".into()));
            "/discover/tv"
        }
        HomeSection::TopRated => {
            params.push(("sort_by", "vote_average.desc".into()));
            params.push(("vote_count.gte", "200".into()));
            "/discover/movie"
        }
        HomeSection::Upcoming => {
            params.push(("sort_by", "primary_release_date.asc".into()));
            params.push((
                "primary_release_date.gte",
                today.format("%Y-%m-%d").to_string(),
            ));
            "/discover/movie"
        }
    };
    (path, params)
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn details(&self, kind: ContentKind, id: &str) -> Result<TmdbTitle, MetadataError> {
        self.get(&title_path(kind, id, ""), &[]).await
    }

    async fn credits(&self, kind: ContentKind, id: &str) -> Result<TmdbCredits, MetadataError> {
        self.get(&title_path(kind, id, "/credits"), &[]).await
    }

    async fn watch_providers(
        &self,
        kind: ContentKind,
        id: &str,
    ) -> Result<TmdbWatchProviders, MetadataError> {
        self.get(&title_path(kind, id, "/watch/providers"), &[])
            .await
    }

    async fn recommendations(
        &self,
        kind: ContentKind,
        id: &str,
    ) -> Result<Vec<TmdbListItem>, MetadataError> {
        let page: TmdbPage<TmdbListItem> = self
            .get(&title_path(kind, id, "/recommendations"), &[("page", "1")])
            .await?;
        Ok(page.results)
    }

    async fn discover(&self, section: HomeSection) -> Result<Vec<TmdbListItem>, MetadataError> {
        let today = chrono::Utc::now().date_naive();
        let (path, params) = discover_request(section, &self.region, today);
        let borrowed: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let page: TmdbPage<TmdbListItem> = self.get(path, &borrowed).await?;
        Ok(page.results)
    }
}
