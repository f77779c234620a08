use shared::PredictionResult;
use std::cmp::Ordering;

// Untiered results sort after every tier.
const UNTIERED_PRIORITY: u8 = u8::MAX;

/// Orders results by tier (Safe, Target, Dream), then by probability,
/// highest first. The sort is stable, so ties keep catalog order.
pub fn rank(mut results: Vec<PredictionResult>) -> Vec<PredictionResult> {
    results.sort_by(compare);
    results
}

fn compare(a: &PredictionResult, b: &PredictionResult) -> Ordering {
    let tier_a = a.status.map_or(UNTIERED_PRIORITY, |tier| tier.priority());
    let tier_b = b.status.map_or(UNTIERED_PRIORITY, |tier| tier.priority());
    tier_a
        .cmp(&tier_b)
        .then_with(|| b.probability.total_cmp(&a.probability))
}
