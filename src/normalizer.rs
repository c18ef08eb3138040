use crate::model::{DistributionTarget, Job, JobProfile, TargetProfile};
use crate::utils::fold;
use tracing::warn;

/// Location values the scraper emits when the posting has none.
const LOCATION_PLACEHOLDERS: &[&str] = &[
    "-", "n/a", "na", "none", "null", "undefined", "unknown", "not specified",
    "לא צוין", "לא צויין", "לא ידוע", "ללא",
];

pub fn clean_location(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(loc) if !loc.is_empty() && !LOCATION_PLACEHOLDERS.contains(&fold(loc).as_str()) => loc.to_string(),
        _ => String::new(),
    }
}

pub fn job_profile(job: &Job) -> JobProfile {
    JobProfile {
        location: clean_location(job.location.as_deref()),
        title: job.title.trim().to_string(),
        description: job.description.trim().to_string(),
    }
}

/// Converts a stored group into scoring input. Groups without a name are
/// skipped rather than scored.
pub fn target_profile(target: &DistributionTarget) -> Option<TargetProfile> {
    let name = target.name.trim();
    if name.is_empty() {
        warn!("Skipping group {} with no name", target.id);
        return None;
    }

    let tags = target
        .tags
        .iter()
        .flatten()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    let region = target
        .region
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    Some(TargetProfile {
        id: target.id.clone(),
        name: name.to_string(),
        url: target.url.clone(),
        tags,
        region,
    })
}

/// Member groups with usable data, in their original order.
pub fn eligible_targets(targets: &[DistributionTarget]) -> Vec<TargetProfile> {
    targets
        .iter()
        .filter(|t| t.is_member)
        .filter_map(target_profile)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn group(id: &str, name: &str, is_member: bool) -> DistributionTarget {
        DistributionTarget {
            id: id.to_string(),
            name: name.to_string(),
            url: String::new(),
            is_member,
            tags: None,
            region: None,
            keywords: None,
        }
    }

    #[test]
    fn placeholders_become_empty() {
        assert_eq!(clean_location(None), "");
        assert_eq!(clean_location(Some("  ")), "");
        assert_eq!(clean_location(Some("N/A")), "");
        assert_eq!(clean_location(Some("לא צוין")), "");
        assert_eq!(clean_location(Some(" חיפה ")), "חיפה");
    }

    #[test]
    fn job_profile_trims_fields() {
        let job = Job {
            id: "j1".into(),
            title: " מאבטח ".into(),
            description: "משמרות ".into(),
            location: Some("unknown".into()),
            company: String::new(),
            link: String::new(),
            status: Default::default(),
            fetched_at: Utc::now(),
        };
        let p = job_profile(&job);
        assert_eq!(p.title, "מאבטח");
        assert_eq!(p.description, "משמרות");
        assert_eq!(p.location, "");
    }

    #[test]
    fn target_defaults_and_cleanup() {
        let mut g = group("g1", " דרושים חיפה ", true);
        g.tags = Some(vec!["".into(), " קריות ".into()]);
        g.region = Some("  ".into());
        let p = target_profile(&g).unwrap();
        assert_eq!(p.name, "דרושים חיפה");
        assert_eq!(p.tags, vec!["קריות".to_string()]);
        assert_eq!(p.region, None);
    }

    #[test]
    fn skips_nameless_and_non_member_groups() {
        let groups = vec![
            group("a", "דרושים", true),
            group("b", "", true),
            group("c", "משרות", false),
            group("d", "עבודה", true),
        ];
        let ids: Vec<String> = eligible_targets(&groups).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a", "d"]);
    }
}
