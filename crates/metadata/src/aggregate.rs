//! Fan-out / fan-in over the metadata provider.
//!
//! Details are essential: their failure fails the request. Credits, watch
//! providers and recommendations are enrichments: a failure is logged and the
//! field comes back empty. All calls are started together and every one of
//! them settles before any outcome is inspected.

use std::sync::Arc;

use marquee_core::config::Config;
use marquee_core::types::{ContentKind, OfferKind};
use marquee_db::repo::extras::{ExtrasFields, ExtrasRecord};
use tracing::{debug, warn};

use crate::extras::ExtrasCache;
use crate::gemini::ReviewContext;
use crate::payload::{HOME_SECTION_LIMIT, PayloadBuilder};
use crate::provider::{HomeSection, MetadataProvider, VideoProvider};
use crate::tmdb::{TmdbCredits, TmdbListItem, TmdbTitle, TmdbWatchProviders};
use crate::{HomeFeed, MediaCard, MetadataError, MovieDetail, RegionOffers, VideoLink};

/// Raw responses for one title after fan-in.
#[derive(Debug, Clone, Default)]
pub struct TitleBundle {
    pub details: TmdbTitle,
    pub credits: TmdbCredits,
    pub providers: TmdbWatchProviders,
    pub recommendations: Vec<TmdbListItem>,
}

pub struct Aggregator {
    metadata: Arc<dyn MetadataProvider>,
    videos: Arc<dyn VideoProvider>,
    extras: ExtrasCache,
    payload: PayloadBuilder,
    region: String,
}

impl Aggregator {
    pub fn new(
        config: &Config,
        metadata: Arc<dyn MetadataProvider>,
        videos: Arc<dyn VideoProvider>,
        extras: ExtrasCache,
    ) -> Self {
        Self {
            metadata,
            videos,
            extras,
            payload: PayloadBuilder::new(&config.tmdb.image_base),
            region: config.region.clone(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn extras(&self) -> &ExtrasCache {
        &self.extras
    }

    /// Fetch details, credits, providers and recommendations concurrently.
    pub async fn fetch_title(
        &self,
        kind: ContentKind,
        id: &str,
    ) -> Result<TitleBundle, MetadataError> {
        let id = validate_id(id)?;

        let (details, credits, providers, recommendations) = tokio::join!(
            self.metadata.details(kind, id),
            self.metadata.credits(kind, id),
            self.metadata.watch_providers(kind, id),
            self.metadata.recommendations(kind, id),
        );

        let details = details.inspect_err(|e| {
            debug!(
                provider = self.metadata.name(),
                id,
                error = %e,
                "essential details call failed"
            );
        })?;

        Ok(TitleBundle {
            details,
            credits: degrade("credits", id, credits),
            providers: degrade("watch_providers", id, providers),
            recommendations: degrade("recommendations", id, recommendations),
        })
    }

    /// The combined movie page, including the cached songs playlist.
    pub async fn movie_detail(&self, id: &str) -> Result<MovieDetail, MetadataError> {
        let bundle = self.fetch_title(ContentKind::Movie, id).await?;

        let songs_playlist_url = match bundle.details.display_title() {
            Some(title) => {
                self.songs_playlist(bundle.details.id, title, bundle.details.year())
                    .await
            }
            None => None,
        };

        Ok(self.payload.movie_detail(
            &bundle.details,
            &bundle.credits,
            &bundle.providers,
            bundle.recommendations,
            &self.region,
            songs_playlist_url,
        ))
    }

    /// Watch providers for one title in the configured region.
    pub async fn region_offers(
        &self,
        kind: ContentKind,
        id: &str,
    ) -> Result<RegionOffers, MetadataError> {
        let id = validate_id(id)?;
        let providers = self.metadata.watch_providers(kind, id).await?;
        Ok(self.payload.region_offers(&providers, &self.region))
    }

    /// The four home lists. A failed list is served empty; the feed only
    /// fails when every list failed.
    pub async fn home_feed(&self) -> Result<HomeFeed, MetadataError> {
        let (trending, web_series, top_rated, upcoming) = tokio::join!(
            self.metadata.discover(HomeSection::Trending),
            self.metadata.discover(HomeSection::WebSeries),
            self.metadata.discover(HomeSection::TopRated),
            self.metadata.discover(HomeSection::Upcoming),
        );

        match (trending, web_series, top_rated, upcoming) {
            (Err(e), Err(_), Err(_), Err(_)) => Err(e),
            (trending, web_series, top_rated, upcoming) => Ok(HomeFeed {
                trending: self.section_cards(HomeSection::Trending, trending),
                web_series: self.section_cards(HomeSection::WebSeries, web_series),
                top_rated: self.section_cards(HomeSection::TopRated, top_rated),
                upcoming: self.section_cards(HomeSection::Upcoming, upcoming),
            }),
        }
    }

    fn section_cards(
        &self,
        section: HomeSection,
        result: Result<Vec<TmdbListItem>, MetadataError>,
    ) -> Vec<MediaCard> {
        let items = degrade(section.as_str(), "home", result);
        self.payload.cards(items, HOME_SECTION_LIMIT)
    }

    pub async fn trailer(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<VideoLink>, MetadataError> {
        self.videos.find_trailer(title, year).await
    }

    /// Inputs for the review prompt, from the same fan-out as the movie page.
    pub async fn review_context(&self, id: &str) -> Result<ReviewContext, MetadataError> {
        let bundle = self.fetch_title(ContentKind::Movie, id).await?;
        let offers = self.payload.region_offers(&bundle.providers, &self.region);
        let details = bundle.details;

        Ok(ReviewContext {
            tmdb_id: details.id,
            title: details.display_title().unwrap_or("Unknown Title").to_string(),
            year: details.year(),
            genres: details.genre_names(),
            overview: details.overview,
            vote_average: details.vote_average,
            vote_count: details.vote_count,
            budget: details.budget,
            revenue: details.revenue,
            cast: bundle
                .credits
                .cast
                .into_iter()
                .map(|c| (c.name, c.character))
                .collect(),
            streaming_providers: offers
                .platforms
                .into_iter()
                .filter(|o| o.kind == OfferKind::Flatrate)
                .map(|o| o.platform)
                .collect(),
            similar_titles: bundle
                .recommendations
                .into_iter()
                .filter_map(|r| r.title.or(r.name))
                .collect(),
        })
    }

    /// Lookaside for the songs playlist: lookup, derive on miss, upsert on
    /// success. Every failure here degrades to `None`.
    async fn songs_playlist(&self, tmdb_id: i64, title: &str, year: Option<i32>) -> Option<String> {
        if tmdb_id <= 0 {
            return None;
        }

        match self.extras.lookup(tmdb_id).await {
            Ok(Some(ExtrasRecord {
                songs_playlist_url: Some(url),
                ..
            })) => {
                debug!(tmdb_id, "songs playlist served from extras cache");
                return Some(url);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(tmdb_id, error = %e, "extras lookup failed; serving without songs playlist");
                return None;
            }
        }

        let link = match self.videos.find_songs_playlist(title, year).await {
            Ok(Some(link)) => link,
            Ok(None) => {
                debug!(tmdb_id, title, "no songs playlist found");
                return None;
            }
            Err(e) => {
                warn!(tmdb_id, error = %e, "songs playlist search failed");
                return None;
            }
        };

        match link {
            VideoLink::Resolved { embed_url, .. } => {
                let fields = ExtrasFields {
                    songs_playlist_url: Some(embed_url.clone()),
                };
                if let Err(e) = self.extras.upsert(tmdb_id, &fields).await {
                    warn!(tmdb_id, error = %e, "failed to store songs playlist");
                }
                Some(embed_url)
            }
            // A search link is not a resolution; keep the slot open for a
            // later run with a credential.
            VideoLink::SearchFallback { search_url } => Some(search_url),
        }
    }
}

fn validate_id(id: &str) -> Result<&str, MetadataError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(MetadataError::InvalidInput("content id is required".into()));
    }
    Ok(id)
}

fn degrade<T: Default>(field: &str, id: &str, result: Result<T, MetadataError>) -> T {
    result.unwrap_or_else(|e| {
        warn!(field, id, error = %e, "enrichment call failed; serving empty field");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_rejected_before_any_call() {
        assert!(matches!(validate_id("   "), Err(MetadataError::InvalidInput(_))));
        assert_eq!(validate_id(" 550 ").unwrap(), "550");
    }

    #[test]
    fn degrade_turns_failures_into_defaults() {
        let failed: Result<Vec<u8>, MetadataError> = Err(MetadataError::NotFound);
        assert!(degrade("credits", "1", failed).is_empty());
        assert_eq!(degrade("credits", "1", Ok(vec![1u8])), vec![1]);
    }
}
