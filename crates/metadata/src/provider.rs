use marquee_core::types::ContentKind;

use crate::tmdb::{TmdbCredits, TmdbListItem, TmdbTitle, TmdbWatchProviders};
use crate::{MetadataError, VideoLink};

/// The four home-page lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeSection {
    Trending,
    WebSeries,
    TopRated,
    Upcoming,
}

impl HomeSection {
    pub const ALL: [HomeSection; 4] = [
        Self::Trending,
        Self::WebSeries,
        Self::TopRated,
        Self::Upcoming,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::WebSeries => "web_series",
            Self::TopRated => "top_rated",
            Self::Upcoming => "upcoming",
        }
    }
}

/// A metadata provider that answers per-title and list queries.
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Core details. `MetadataError::NotFound` when the id does not exist.
    async fn details(&self, kind: ContentKind, id: &str) -> Result<TmdbTitle, MetadataError>;

    async fn credits(&self, kind: ContentKind, id: &str) -> Result<TmdbCredits, MetadataError>;

    /// Watch providers for every region the provider knows about.
    async fn watch_providers(
        &self,
        kind: ContentKind,
        id: &str,
    ) -> Result<TmdbWatchProviders, MetadataError>;

    /// Similar titles, in provider rank order.
    async fn recommendations(
        &self,
        kind: ContentKind,
        id: &str,
    ) -> Result<Vec<TmdbListItem>, MetadataError>;

    async fn discover(&self, section: HomeSection) -> Result<Vec<TmdbListItem>, MetadataError>;
}

/// Keyword video search.
#[async_trait::async_trait]
pub trait VideoProvider: Send + Sync {
    /// Best trailer for a title. `Ok(None)` when the search came back empty.
    async fn find_trailer(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<VideoLink>, MetadataError>;

    async fn find_songs_playlist(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<VideoLink>, MetadataError>;
}

/// Free-form text generation from a prompt.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, MetadataError>;
}
