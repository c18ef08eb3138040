// Location normalization and geographic match scoring
use crate::geo::knowledge_base::{KnowledgeBase, Region};
use crate::utils::{contains_any, fold};
use std::collections::BTreeSet;
use tracing::debug;

/// Score for a target in a different named region than the job.
pub const SCORE_REGION_BLOCK: i32 = -1000;
/// The job's city is one of the target's cities.
pub const SCORE_CITY_MATCH: i32 = 100;
/// Same region, target is region-wide.
pub const SCORE_REGION_WIDE: i32 = 50;
/// Same region, target names other cities.
pub const SCORE_NEIGHBOR_CITY: i32 = 20;
/// Target has no region at all.
pub const SCORE_GENERAL_TARGET: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedLocation {
    pub city: Option<String>,
    pub region: Region,
    pub original: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupGeo {
    pub cities: BTreeSet<String>,
    pub region: Region,
}

/// Stateless engine over a read-only knowledge base. `Copy`, so callers on
/// any thread can hold their own.
#[derive(Debug, Clone, Copy)]
pub struct GeoEngine<'kb> {
    kb: &'kb KnowledgeBase,
}

impl GeoEngine<'static> {
    pub fn builtin() -> Self {
        Self::new(KnowledgeBase::builtin())
    }
}

impl Default for GeoEngine<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'kb> GeoEngine<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        Self { kb }
    }

    pub fn knowledge_base(&self) -> &'kb KnowledgeBase {
        self.kb
    }

    /// Resolves free text to a canonical city and region.
    ///
    /// The first table entry with a matching keyword wins. Without a city,
    /// bare region tokens are tried in `Region::PRIORITY` order.
    pub fn normalize(&self, raw: &str) -> NormalizedLocation {
        let text = fold(raw);
        if text.is_empty() {
            return NormalizedLocation {
                city: None,
                region: Region::General,
                original: String::new(),
            };
        }

        if let Some(entry) = self.kb.entries().iter().find(|e| e.matches(&text)) {
            return NormalizedLocation {
                city: Some(entry.name.clone()),
                region: entry.region,
                original: raw.to_string(),
            };
        }

        let region = Region::PRIORITY
            .into_iter()
            .find(|r| contains_any(&text, r.keywords()))
            .unwrap_or(Region::General);

        NormalizedLocation {
            city: None,
            region,
            original: raw.to_string(),
        }
    }

    /// Infers which cities and region a group serves from its name and tags.
    ///
    /// Unlike `normalize`, every matching city is collected and the last one
    /// sets the region. A matched keyword is blanked out of the search text,
    /// so a shorter name inside it ("יהוד" in "אבן יהודה") cannot match too.
    /// Explicit region tokens or a declared region then override the region,
    /// checked in `Region::PRIORITY` order against the unblanked text.
    pub fn analyze_group(&self, name: &str, tags: &[String], declared_region: Option<&str>) -> GroupGeo {
        let mut text = fold(name);
        for tag in tags {
            text.push(' ');
            text.push_str(&fold(tag));
        }

        let mut geo = GroupGeo::default();
        let mut remaining = text.clone();
        for entry in self.kb.entries() {
            if entry.consume(&mut remaining) {
                geo.cities.insert(entry.name.clone());
                geo.region = entry.region;
            }
        }

        let declared = declared_region.and_then(Region::parse);
        if let Some(region) = Region::PRIORITY
            .into_iter()
            .find(|r| declared == Some(*r) || contains_any(&text, r.keywords()))
        {
            geo.region = region;
        }

        geo
    }

    /// Geographic compatibility of a job location with a target. Rules are
    /// checked in order and the first one that applies decides.
    pub fn score(&self, job_location: &str, target_name: &str, target_tags: &[String], target_region: Option<&str>) -> i32 {
        let job = self.normalize(job_location);
        let target = self.analyze_group(target_name, target_tags, target_region);

        let score = if !job.region.is_general() && !target.region.is_general() && job.region != target.region {
            SCORE_REGION_BLOCK
        } else if job.city.as_ref().is_some_and(|c| target.cities.contains(c)) {
            SCORE_CITY_MATCH
        } else if !job.region.is_general() && job.region == target.region {
            if target.cities.is_empty() {
                SCORE_REGION_WIDE
            } else {
                SCORE_NEIGHBOR_CITY
            }
        } else if target.region.is_general() {
            SCORE_GENERAL_TARGET
        } else {
            0
        };

        debug!(
            "geo score {} for '{}' ({:?}/{}) vs '{}' ({:?}/{})",
            score, job_location, job.city, job.region, target_name, target.cities, target.region
        );
        score
    }
}
