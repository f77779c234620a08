use rand::SeedableRng;
use rand::rngs::StdRng;
use shared::{InstitutionRecord, PredictionRequest, PredictionResult, Tier};
use std::sync::{Arc, Mutex};

use crate::catalog::Catalog;
use crate::predictor::matcher::{self, MatchPolicy};
use crate::predictor::{ranker, scorer};

/// How many catalog entries are scored when nothing else is available.
pub const CANNED_FALLBACK_SIZE: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    #[error("Random source lock poisoned")]
    RngPoisoned,
}

#[derive(Debug, Clone, Copy)]
pub struct EstimatorSettings {
    pub match_policy: MatchPolicy,
    /// Attach Safe/Target/Dream labels to locally computed results.
    pub assign_tiers: bool,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            match_policy: MatchPolicy::default(),
            assign_tiers: false,
        }
    }
}

#[derive(Clone)]
pub struct Estimator {
    catalog: Arc<Catalog>,
    rng: Arc<Mutex<StdRng>>,
    settings: EstimatorSettings,
}

impl Estimator {
    pub fn new(catalog: Arc<Catalog>, settings: EstimatorSettings) -> Self {
        Self::with_rng(catalog, settings, StdRng::from_os_rng())
    }

    pub fn with_seed(catalog: Arc<Catalog>, settings: EstimatorSettings, seed: u64) -> Self {
        Self::with_rng(catalog, settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Arc<Catalog>, settings: EstimatorSettings, rng: StdRng) -> Self {
        Self {
            catalog,
            rng: Arc::new(Mutex::new(rng)),
            settings,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &EstimatorSettings {
        &self.settings
    }

    /// Matches, scores and ranks catalog institutions for a validated request.
    /// An empty list means nothing matched.
    pub fn estimate(
        &self,
        request: &PredictionRequest,
    ) -> Result<Vec<PredictionResult>, EstimatorError> {
        let candidates = matcher::match_candidates(
            request,
            self.catalog.records(),
            &self.settings.match_policy,
        );
        log::debug!("{} candidate institutions for request", candidates.len());
        self.score_candidates(request.rank, &candidates)
    }

    /// Like [`Estimator::estimate`], but when nothing matches, scores the
    /// first few catalog institutions so the caller always gets a list
    /// unless the catalog itself is empty.
    pub fn estimate_or_canned(
        &self,
        request: &PredictionRequest,
    ) -> Result<Vec<PredictionResult>, EstimatorError> {
        let results = self.estimate(request)?;
        if !results.is_empty() {
            return Ok(results);
        }

        let canned: Vec<&InstitutionRecord> = self
            .catalog
            .records()
            .iter()
            .take(CANNED_FALLBACK_SIZE)
            .collect();
        log::warn!(
            "Local estimate was empty, scoring {} catalog institutions instead",
            canned.len()
        );
        self.score_candidates(request.rank, &canned)
    }

    fn score_candidates(
        &self,
        user_rank: f64,
        candidates: &[&InstitutionRecord],
    ) -> Result<Vec<PredictionResult>, EstimatorError> {
        let mut rng = self.rng.lock().map_err(|_| EstimatorError::RngPoisoned)?;

        let results = candidates
            .iter()
            .map(|record| {
                let probability = scorer::score(user_rank, record.cutoff, &mut *rng);
                PredictionResult {
                    college: record.name.clone(),
                    course: record.course.clone(),
                    location: record.location.clone(),
                    probability,
                    cutoff_score: record.cutoff,
                    status: self
                        .settings
                        .assign_tiers
                        .then(|| Tier::from_probability(probability)),
                }
            })
            .collect();

        Ok(ranker::rank(results))
    }
}
