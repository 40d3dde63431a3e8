//! Pure shaping of raw TMDB responses into the frontend payloads.
//!
//! Nothing here does I/O. Truncation is always a prefix of the order the
//! provider delivered, which is already rank ordered.

use std::collections::HashSet;

use marquee_core::types::OfferKind;

use crate::tmdb::{
    TmdbCastEntry, TmdbCredits, TmdbCrewEntry, TmdbListItem, TmdbTitle, TmdbWatchProviders,
};
use crate::{CastMember, CrewRoles, MediaCard, MovieDetail, RegionOffers, StreamingOffer};

pub const CAST_LIMIT: usize = 12;
pub const RECOMMENDATION_LIMIT: usize = 20;
pub const HOME_SECTION_LIMIT: usize = 20;

const DIRECTOR_JOBS: &[&str] = &["Director"];
const WRITER_JOBS: &[&str] = &["Writer", "Screenplay", "Story"];
const PRODUCER_JOBS: &[&str] = &["Producer", "Executive Producer"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Poster,
    Backdrop,
    Profile,
    Logo,
    Card,
}

impl ImageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poster => "w500",
            Self::Backdrop => "w780",
            Self::Profile => "w185",
            Self::Logo => "w92",
            Self::Card => "w342",
        }
    }
}

/// Keep the first `n` entries in their original order.
pub fn cap<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    items.truncate(n);
    items
}

/// Compact money display: `$1.5B`, `$2.3M`, `$750.0K`, `$999`.
///
/// The suffix follows the raw amount; the mantissa gets one decimal, rounded
/// half-up, so `999_950_000` is `$1000.0M`. Zero, negative and absent amounts
/// have no display value.
pub fn format_money(amount: Option<i64>) -> Option<String> {
    let amount = u128::try_from(amount?).ok().filter(|a| *a > 0)?;

    let Some((unit, suffix)) = [(1_000_000_000u128, "B"), (1_000_000, "M"), (1_000, "K")]
        .into_iter()
        .find(|(unit, _)| amount >= *unit)
    else {
        return Some(format!("${amount}"));
    };
    let tenths = (amount * 10 + unit / 2) / unit;
    Some(format!("${}.{}{suffix}", tenths / 10, tenths % 10))
}

/// Split a flat crew list into role lists. Each entry has one job and lands in
/// at most one list. A person credited twice for the same role is listed
/// once; namesakes with different ids are both kept.
pub fn crew_roles(crew: &[TmdbCrewEntry]) -> CrewRoles {
    let mut roles = CrewRoles::default();
    let mut seen: HashSet<(usize, i64, &str)> = HashSet::new();
    for entry in crew {
        let Some(job) = entry.job.as_deref() else {
            continue;
        };
        let (slot, bucket) = if DIRECTOR_JOBS.contains(&job) {
            (0, &mut roles.directors)
        } else if WRITER_JOBS.contains(&job) {
            (1, &mut roles.writers)
        } else if PRODUCER_JOBS.contains(&job) {
            (2, &mut roles.producers)
        } else {
            continue;
        };
        if !entry.name.is_empty() && seen.insert((slot, entry.id, entry.name.as_str())) {
            bucket.push(entry.name.clone());
        }
    }
    roles
}

/// Builds absolute image URLs from TMDB path fragments.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    image_base: String,
}

impl PayloadBuilder {
    pub fn new(image_base: &str) -> Self {
        Self {
            image_base: image_base.trim_end_matches('/').to_string(),
        }
    }

    /// `None` for a missing or empty fragment; never a half-built URL.
    pub fn image_url(&self, path: Option<&str>, size: ImageSize) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;
        let sep = if path.starts_with('/') { "" } else { "/" };
        Some(format!("{}/{}{sep}{path}", self.image_base, size.as_str()))
    }

    pub fn cast(&self, cast: &[TmdbCastEntry]) -> Vec<CastMember> {
        cast.iter()
            .take(CAST_LIMIT)
            .map(|person| CastMember {
                id: person.id,
                name: person.name.clone(),
                character: person.character.clone().filter(|c| !c.is_empty()),
                profile_url: self.image_url(person.profile_path.as_deref(), ImageSize::Profile),
            })
            .collect()
    }

    pub fn card(&self, item: &TmdbListItem) -> MediaCard {
        MediaCard {
            id: item.id,
            title: item
                .title
                .clone()
                .or_else(|| item.name.clone())
                .unwrap_or_default(),
            overview: item.overview.clone(),
            poster_url: self.image_url(item.poster_path.as_deref(), ImageSize::Card),
            backdrop_url: self.image_url(item.backdrop_path.as_deref(), ImageSize::Backdrop),
            vote_average: item.vote_average,
            release_date: item
                .release_date
                .clone()
                .or_else(|| item.first_air_date.clone()),
        }
    }

    pub fn cards(&self, items: Vec<TmdbListItem>, limit: usize) -> Vec<MediaCard> {
        cap(items, limit).iter().map(|i| self.card(i)).collect()
    }

    /// Offers for exactly one region, streaming first, then rent, then buy.
    /// A region with no data yields an empty list.
    pub fn region_offers(&self, providers: &TmdbWatchProviders, region: &str) -> RegionOffers {
        let Some(scoped) = providers.results.get(region) else {
            return RegionOffers {
                country: region.to_string(),
                ..Default::default()
            };
        };

        let platforms = [
            (OfferKind::Flatrate, &scoped.flatrate),
            (OfferKind::Rent, &scoped.rent),
            (OfferKind::Buy, &scoped.buy),
        ]
        .into_iter()
        .flat_map(|(kind, offers)| {
            offers.iter().map(move |p| StreamingOffer {
                platform: p.provider_name.clone(),
                logo_url: self.image_url(p.logo_path.as_deref(), ImageSize::Logo),
                kind,
            })
        })
        .collect();

        RegionOffers {
            country: region.to_string(),
            platforms,
            tmdb_link: scoped.link.clone(),
        }
    }

    /// Assemble the movie page. Enrichment inputs that failed upstream arrive
    /// here as empty defaults.
    pub fn movie_detail(
        &self,
        details: &TmdbTitle,
        credits: &TmdbCredits,
        providers: &TmdbWatchProviders,
        recommendations: Vec<TmdbListItem>,
        region: &str,
        songs_playlist_url: Option<String>,
    ) -> MovieDetail {
        let roles = crew_roles(&credits.crew);
        MovieDetail {
            id: details.id,
            title: details.display_title().unwrap_or("Untitled").to_string(),
            overview: details.overview.clone(),
            release_date: details.date().map(str::to_string),
            runtime: details.runtime,
            vote_average: details.vote_average,
            genres: details.genre_names(),
            poster_url: self.image_url(details.poster_path.as_deref(), ImageSize::Poster),
            backdrop_url: self.image_url(details.backdrop_path.as_deref(), ImageSize::Backdrop),
            budget: format_money(details.budget),
            revenue: format_money(details.revenue),
            cast: self.cast(&credits.cast),
            directors: roles.directors,
            writers: roles.writers,
            producers: roles.producers,
            streaming: self.region_offers(providers, region).platforms,
            recommendations: self.cards(recommendations, RECOMMENDATION_LIMIT),
            songs_playlist_url,
        }
    }
}
