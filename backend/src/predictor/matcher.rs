use shared::{InstitutionRecord, PredictionRequest};

/// Course keywords the relaxed match treats as "similar enough".
const RELATED_COURSE_KEYWORDS: &[&str] = &["computer", "information"];

pub const DEFAULT_FALLBACK_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct MatchPolicy {
    /// Substitute related institutions when nothing matches the request.
    pub allow_fallback_match: bool,
    pub fallback_limit: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            allow_fallback_match: true,
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
        }
    }
}

/// Selects candidate institutions for a request, in catalog order.
///
/// The primary filter is a case-insensitive substring match on course and,
/// when given, location. If that finds nothing and the policy allows it,
/// institutions offering a computing-related course are returned instead,
/// capped at `fallback_limit`. These may have nothing to do with the course
/// that was asked for.
pub fn match_candidates<'a>(
    request: &PredictionRequest,
    records: &'a [InstitutionRecord],
    policy: &MatchPolicy,
) -> Vec<&'a InstitutionRecord> {
    let course = request.course.trim().to_lowercase();
    let location = request.location_filter().map(str::to_lowercase);

    let primary: Vec<&InstitutionRecord> = records
        .iter()
        .filter(|record| {
            let course_match = course.is_empty() || record.course.to_lowercase().contains(&course);
            let location_match = location
                .as_deref()
                .is_none_or(|location| record.location.to_lowercase().contains(location));
            course_match && location_match
        })
        .collect();

    if !primary.is_empty() || !policy.allow_fallback_match || course.is_empty() {
        return primary;
    }

    let related: Vec<&InstitutionRecord> = records
        .iter()
        .filter(|record| {
            let record_course = record.course.to_lowercase();
            RELATED_COURSE_KEYWORDS
                .iter()
                .any(|keyword| record_course.contains(keyword))
        })
        .take(policy.fallback_limit)
        .collect();

    log::info!(
        "No institutions matched course '{}', substituting {} related institutions",
        request.course,
        related.len()
    );
    related
}
