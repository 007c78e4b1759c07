use tracing::{info, warn};

use crate::constants::search as limits;
use crate::db::Store;
use crate::entities::{landingsplasser, vass_vann};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    Water,
    LandingSite,
}

impl SearchSource {
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Water => limits::WATER_COLOR,
            Self::LandingSite => limits::LANDING_SITE_COLOR,
        }
    }

    /// Norwegian label shown in the result list.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Water => "Vann",
            Self::LandingSite => "Landingsplass",
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: i32,
    pub source: SearchSource,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub display_name: String,
    pub color: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl From<vass_vann::Model> for SearchHit {
    fn from(model: vass_vann::Model) -> Self {
        Self {
            id: model.id,
            source: SearchSource::Water,
            kind: SearchSource::Water.label(),
            display_name: model.name,
            color: SearchSource::Water.color(),
            lat: model.lat,
            lng: model.lng,
        }
    }
}

impl From<landingsplasser::Model> for SearchHit {
    fn from(model: landingsplasser::Model) -> Self {
        // lp wins, kode fills in, the id is the last resort. Empty strings
        // count as missing, like the frontend always treated them.
        let display_name = model
            .lp
            .filter(|lp| !lp.is_empty())
            .or_else(|| model.kode.filter(|kode| !kode.is_empty()))
            .unwrap_or_else(|| format!("Landingsplass {}", model.id));

        Self {
            id: model.id,
            source: SearchSource::LandingSite,
            kind: SearchSource::LandingSite.label(),
            display_name,
            color: SearchSource::LandingSite.color(),
            lat: model.lat,
            lng: model.lng,
        }
    }
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub results: Vec<SearchHit>,
    /// Merged count before truncation.
    pub total: usize,
}

#[derive(Clone)]
pub struct SearchService {
    store: Store,
}

impl SearchService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Runs both lookups and ranks the merged results.
    ///
    /// A failing lookup is absorbed: it is logged, contributes nothing, and
    /// triggers an unfiltered diagnostic sample of the same table so the log
    /// shows whether the table was readable at all.
    pub async fn search(&self, term: &str) -> SearchOutcome {
        let mut hits: Vec<SearchHit> = Vec::new();

        match self.store.waters_matching(term).await {
            Ok(rows) => hits.extend(rows.into_iter().map(SearchHit::from)),
            Err(err) => {
                warn!("Water lookup failed for '{term}': {err:#}");
                self.log_water_sample().await;
            }
        }

        match self.store.landing_sites_matching(term).await {
            Ok(rows) => hits.extend(rows.into_iter().map(SearchHit::from)),
            Err(err) => {
                warn!("Landing-site lookup failed for '{term}': {err:#}");
                self.log_landing_site_sample().await;
            }
        }

        rank_and_truncate(hits, term)
    }

    async fn log_water_sample(&self) {
        match self.store.water_sample().await {
            Ok(rows) => info!("Unfiltered vass_vann sample returned {} rows", rows.len()),
            Err(err) => warn!("Unfiltered vass_vann sample also failed: {err:#}"),
        }
    }

    async fn log_landing_site_sample(&self) {
        match self.store.landing_site_sample().await {
            Ok(rows) => info!(
                "Unfiltered landingsplasser sample returned {} rows",
                rows.len()
            ),
            Err(err) => warn!("Unfiltered landingsplasser sample also failed: {err:#}"),
        }
    }
}

/// Exact case-insensitive matches first, the rest in case-insensitive
/// lexicographic order, cut down to the response cap.
#[must_use]
pub fn rank_and_truncate(mut hits: Vec<SearchHit>, term: &str) -> SearchOutcome {
    let needle = term.to_lowercase();

    hits.sort_by(|a, b| {
        let a_exact = a.display_name.to_lowercase() == needle;
        let b_exact = b.display_name.to_lowercase() == needle;

        match (a_exact, b_exact) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a
                .display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase()),
        }
    });

    let total = hits.len();
    hits.truncate(limits::MAX_RESULTS);

    SearchOutcome {
        results: hits,
        total,
    }
}
