use crate::analyzer::topical::topical_bonus;
use crate::geo::GeoEngine;
use crate::model::{JobProfile, ScoredCandidate, TargetProfile};
use tracing::debug;

/// Added when the raw job location appears verbatim in the target's name.
pub const NAME_MATCH_BONUS: i32 = 200;
/// Topical bonuses apply only to targets scoring above this.
pub const TOPICAL_GATE: i32 = -500;
/// Targets must score strictly above this to be recommended.
pub const MIN_SCORE: i32 = 10;
/// Posting cap per job, set by the platform's anti-abuse limits.
pub const MAX_TARGETS: usize = 3;

/// Trait defining the interface for a target recommender.
pub trait Recommender {
    /// Total score of one target for one job.
    fn score_target(&self, job: &JobProfile, target: &TargetProfile) -> i32;
    /// Ranked shortlist of at most `MAX_TARGETS` targets, best first.
    fn recommend(&self, job: &JobProfile, targets: &[TargetProfile]) -> Vec<ScoredCandidate>;
}

/// Implementation of the recommender on top of the geo engine.
#[derive(Debug, Clone, Copy)]
pub struct RecommenderImpl<'kb> {
    geo: GeoEngine<'kb>,
}

impl RecommenderImpl<'static> {
    pub fn new() -> Self {
        Self { geo: GeoEngine::builtin() }
    }
}

impl Default for RecommenderImpl<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'kb> RecommenderImpl<'kb> {
    pub fn with_engine(geo: GeoEngine<'kb>) -> Self {
        Self { geo }
    }
}

impl Recommender for RecommenderImpl<'_> {
    /// Geo score first, then the name bonus unconditionally. Topical bonuses
    /// only apply while the running total is above `TOPICAL_GATE`, so a
    /// hard-blocked target stays far below `MIN_SCORE` either way.
    fn score_target(&self, job: &JobProfile, target: &TargetProfile) -> i32 {
        let mut score = self
            .geo
            .score(&job.location, &target.name, &target.tags, target.region.as_deref());

        let location = job.location.trim();
        if !location.is_empty() && target.name.contains(location) {
            score += NAME_MATCH_BONUS;
        }

        if score > TOPICAL_GATE {
            let job_text = format!("{} {}", job.title, job.description);
            score += topical_bonus(&job_text, &target.name);
        }

        score
    }

    fn recommend(&self, job: &JobProfile, targets: &[TargetProfile]) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = targets
            .iter()
            .filter_map(|target| {
                let score = self.score_target(job, target);
                debug!("target '{}' scored {}", target.name, score);
                (score > MIN_SCORE).then(|| ScoredCandidate {
                    target_id: target.id.clone(),
                    name: target.name.clone(),
                    url: target.url.clone(),
                    score,
                })
            })
            .collect();

        // Stable: equal scores keep fetch order.
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(MAX_TARGETS);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::engine::{SCORE_CITY_MATCH, SCORE_REGION_BLOCK};

    fn job(location: &str, title: &str) -> JobProfile {
        JobProfile {
            location: location.to_string(),
            title: title.to_string(),
            description: String::new(),
        }
    }

    fn target(id: &str, name: &str, tags: &[&str], region: Option<&str>) -> TargetProfile {
        TargetProfile {
            id: id.to_string(),
            name: name.to_string(),
            url: format!("https://example.com/groups/{id}"),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            region: region.map(str::to_string),
        }
    }

    #[test]
    fn name_bonus_stacks_on_city_match() {
        let r = RecommenderImpl::new();
        let score = r.score_target(&job("חיפה", "נהג"), &target("1", "דרושים בחיפה", &[], None));
        assert_eq!(score, SCORE_CITY_MATCH + NAME_MATCH_BONUS + 5);
    }

    #[test]
    fn town_named_inside_another_is_recommended_to_its_own_group() {
        let r = RecommenderImpl::new();
        let j = job("אבן יהודה", "נהג");
        let t = target("1", "דרושים אבן יהודה", &[], None);
        assert_eq!(r.score_target(&j, &t), SCORE_CITY_MATCH + NAME_MATCH_BONUS + 5);
        let out = r.recommend(&j, &[t]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].score, 305);
    }

    #[test]
    fn blocked_target_gets_name_bonus_but_no_topical_bonus() {
        let r = RecommenderImpl::new();
        // "אשדוד" in a group declared as Jerusalem: blocked, yet the name still contains the location.
        let t = target("1", "הייטק אשדוד", &[], Some("jerusalem"));
        let score = r.score_target(&job("אשדוד", "מפתח/ת תוכנה"), &t);
        assert_eq!(score, SCORE_REGION_BLOCK + NAME_MATCH_BONUS);
        assert!(r.recommend(&job("אשדוד", "מפתח/ת תוכנה"), &[t]).is_empty());
    }

    #[test]
    fn topical_bonus_lifts_general_target() {
        let r = RecommenderImpl::new();
        let t = target("1", "אבטחה ושמירה", &[], None);
        assert_eq!(r.score_target(&job("", "מאבטח/ת"), &t), 10 + 30);
    }

    #[test]
    fn score_of_exactly_ten_is_dropped() {
        let r = RecommenderImpl::new();
        let t = target("1", "לוח כללי", &[], None);
        assert_eq!(r.score_target(&job("חיפה", "נהג"), &t), 10);
        assert!(r.recommend(&job("חיפה", "נהג"), &[t]).is_empty());
    }

    #[test]
    fn keeps_top_three_in_descending_order_and_stable_ties() {
        let r = RecommenderImpl::new();
        let j = job("רמת גן", "מלגזן");
        let targets = vec![
            target("neighbor-a", "קבוצה", &["גבעתיים"], None),        // 20
            target("region-a", "קבוצה", &[], Some("center")),         // 50
            target("general", "קבוצה", &[], None),                    // 10, dropped
            target("region-b", "קבוצה", &[], Some("center")),         // 50
            target("city", "קבוצה", &["רמת גן"], None),               // 100
            target("south", "קבוצה", &["אשדוד"], None),               // blocked
            target("neighbor-b", "קבוצה", &["בני ברק"], None),        // 20
        ];
        let out = r.recommend(&j, &targets);
        let ids: Vec<&str> = out.iter().map(|c| c.target_id.as_str()).collect();
        assert_eq!(ids, vec!["city", "region-a", "region-b"]);
        assert_eq!(out[0].score, 100);
        assert_eq!(out[0].url, "https://example.com/groups/city");
    }

    #[test]
    fn fewer_than_cap_when_few_qualify() {
        let r = RecommenderImpl::new();
        let out = r.recommend(
            &job("באר שבע", "קופאית"),
            &[target("1", "קבוצה", &["באר שבע"], None), target("2", "קבוצה", &["חיפה"], None)],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target_id, "1");
    }

    #[test]
    fn custom_engine_is_used() {
        use crate::geo::{KnowledgeBase, LocationEntry, Region};
        let kb = KnowledgeBase::new(vec![LocationEntry::new("Springfield", Region::North, &["springfield"])]).unwrap();
        let r = RecommenderImpl::with_engine(GeoEngine::new(&kb));
        let t = target("1", "Springfield jobs", &[], None);
        assert_eq!(r.score_target(&job("Springfield", "cashier"), &t), SCORE_CITY_MATCH + NAME_MATCH_BONUS + 5);
    }

    #[test]
    fn no_targets_is_empty_not_error() {
        assert!(RecommenderImpl::new().recommend(&job("חיפה", "נהג"), &[]).is_empty());
    }
}
