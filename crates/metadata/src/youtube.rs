//! YouTube Data API v3 search client.
//!
//! Without an API key the client runs in fallback mode and hands back a
//! search-results link instead of a resolved video or playlist.

use marquee_core::config::{Secret, YouTubeConfig};
use serde::Deserialize;
use tracing::debug;

use crate::provider::VideoProvider;
use crate::upstream::{Provider, Upstream};
use crate::{MetadataError, VideoLink};

const WATCH_SEARCH_URL: &str = "https://www.youtube.com/results";
const EMBED_BASE: &str = "https://www.youtube.com/embed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchKind {
    Video,
    Playlist,
}

impl SearchKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Playlist => "playlist",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    items: Vec<SearchItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
    playlist_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnails {
    default: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl Thumbnails {
    fn best(&self) -> Option<String> {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|t| t.url.clone())
            .next()
    }
}

pub struct YouTubeClient {
    api_key: Option<Secret>,
    region: String,
    upstream: Upstream,
}

impl YouTubeClient {
    pub fn new(config: &YouTubeConfig, region: &str, client: reqwest::Client) -> Self {
        Self {
            api_key: config.api_key.clone(),
            region: region.to_string(),
            upstream: Upstream::new(Provider::YouTube, &config.base_url, client),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.api_key.is_none()
    }

    async fn search(
        &self,
        key: &Secret,
        query: &str,
        kind: SearchKind,
        max_results: u32,
    ) -> Result<Vec<SearchItem>, MetadataError> {
        let max = max_results.to_string();
        let params = [
            ("key", key.expose()),
            ("part", "snippet"),
            ("type", kind.as_str()),
            ("maxResults", max.as_str()),
            ("q", query),
            ("regionCode", self.region.as_str()),
        ];
        let resp: SearchResponse = self.upstream.get_json("/search", &params).await?;
        debug!(query, kind = kind.as_str(), hits = resp.items.len(), "youtube search");
        Ok(resp.items)
    }
}

fn search_query(title: &str, suffix: &str, year: Option<i32>) -> String {
    match year {
        Some(y) => format!("{} {suffix} {y}", title.trim()),
        None => format!("{} {suffix}", title.trim()),
    }
}

fn fallback_link(query: &str) -> VideoLink {
    VideoLink::SearchFallback {
        search_url: format!(
            "{WATCH_SEARCH_URL}?search_query={}",
            urlencoding::encode(query)
        ),
    }
}

fn first_video(items: Vec<SearchItem>) -> Option<VideoLink> {
    items.into_iter().find_map(|item| {
        let id = item.id.video_id.filter(|id| !id.is_empty())?;
        Some(VideoLink::Resolved {
            embed_url: format!("{EMBED_BASE}/{id}"),
            id,
            title: item.snippet.title,
            thumbnail_url: item.snippet.thumbnails.best(),
        })
    })
}

fn first_playlist(items: Vec<SearchItem>) -> Option<VideoLink> {
    items.into_iter().find_map(|item| {
        let id = item.id.playlist_id.filter(|id| !id.is_empty())?;
        Some(VideoLink::Resolved {
            embed_url: format!("{EMBED_BASE}/videoseries?list={id}"),
            id,
            title: item.snippet.title,
            thumbnail_url: item.snippet.thumbnails.best(),
        })
    })
}

#[async_trait::async_trait]
impl VideoProvider for YouTubeClient {
    async fn find_trailer(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<VideoLink>, MetadataError> {
        if title.trim().is_empty() {
            return Ok(None);
        }
        let query = search_query(title, "official trailer", year);
        let Some(key) = &self.api_key else {
            return Ok(Some(fallback_link(&query)));
        };
        let items = self.search(key, &query, SearchKind::Video, 5).await?;
        Ok(first_video(items))
    }

    async fn find_songs_playlist(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<VideoLink>, MetadataError> {
        if title.trim().is_empty() {
            return Ok(None);
        }
        let query = search_query(title, "movie songs playlist", year);
        let Some(key) = &self.api_key else {
            return Ok(Some(fallback_link(&query)));
        };
        let items = self.search(key, &query, SearchKind::Playlist, 3).await?;
        Ok(first_playlist(items))
    }
}
