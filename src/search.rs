//! The hybrid scoring policy: from raw query to ranked song results.
//!
//! [`SongSearcher`] resolves the request's intent (an explicit artist
//! override always wins over the classifier), selects the matching
//! [`ScoringProfile`], executes the query through the injected
//! [`SearchBackend`], and assembles results in backend rank order.
//!
//! The backend call is fail-soft by design: connectivity errors and
//! malformed-query failures degrade to an empty result list with a logged
//! diagnostic. Callers never see a transport error — "zero results" is the
//! worst observable outcome. An empty list for a well-formed query that
//! simply matches nothing is not an error at all.

use anyhow::Result;
use std::sync::Arc;

use crate::backend::SearchBackend;
use crate::config::SearchConfig;
use crate::intent::{classify, Intent};
use crate::models::{Song, SongResult};
use crate::scoring::{build_query_body, LogViewsMultiplier, PopularityScoring, ScoringProfile};

/// The search relevance layer. Stateless per call; cheap to share behind
/// an `Arc` across concurrent requests.
pub struct SongSearcher {
    backend: Arc<dyn SearchBackend>,
    index: String,
    config: SearchConfig,
    popularity: Box<dyn PopularityScoring>,
}

impl SongSearcher {
    /// Create a searcher over `index` with the canonical multiplicative
    /// popularity policy.
    pub fn new(backend: Arc<dyn SearchBackend>, index: impl Into<String>, config: SearchConfig) -> Self {
        Self {
            backend,
            index: index.into(),
            config,
            popularity: Box::new(LogViewsMultiplier),
        }
    }

    /// Substitute the popularity-combination strategy.
    pub fn with_popularity(mut self, popularity: Box<dyn PopularityScoring>) -> Self {
        self.popularity = popularity;
        self
    }

    /// Resolve the effective intent for a request. The caller's artist
    /// override takes precedence over whatever the classifier would say.
    fn resolve_intent(&self, query: &str, artist_boost: bool) -> Intent {
        if artist_boost {
            Intent::ArtistBoost
        } else {
            classify(query, &self.config)
        }
    }

    /// Search for songs matching `query`, returning at most
    /// `search.max_results` ranked results.
    pub async fn search(&self, query: &str, artist_boost: bool) -> Vec<SongResult> {
        let intent = self.resolve_intent(query, artist_boost);
        let profile = ScoringProfile::for_intent(intent);
        let body = build_query_body(
            query,
            &profile,
            self.popularity.as_ref(),
            self.config.max_results,
        );

        let hits = match self.backend.search(&self.index, &body).await {
            Ok(hits) => hits,
            Err(e) => {
                eprintln!("Search error ({}): {:#}", self.popularity.name(), e);
                return Vec::new();
            }
        };

        // Backend order is already combined-score descending; keep it.
        hits.into_iter()
            .filter_map(|hit| match serde_json::from_value::<Song>(hit.source) {
                Ok(song) => Some(SongResult::from_hit(hit.id, hit.score, song)),
                Err(e) => {
                    eprintln!("Skipping malformed document {}: {}", hit.id, e);
                    None
                }
            })
            .take(self.config.max_results)
            .collect()
    }
}

/// CLI entry point — runs a single query and prints ranked results.
pub async fn run_search(searcher: &SongSearcher, query: &str, artist_boost: bool) -> Result<()> {
    let results = searcher.search(query, artist_boost).await;

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, song) in results.iter().enumerate() {
        println!("{}. [{:.2}] {} — {}", i + 1, song.score, song.title, song.artist);
        if let Some(ref album) = song.album {
            println!("    album: {}", album);
        }
        if let Some(year) = song.year {
            println!("    year:  {}", year);
        }
        println!("    views: {}", song.views);
        println!("    id:    {}", song.id);
        println!();
    }

    Ok(())
}
