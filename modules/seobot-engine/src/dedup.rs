//! Duplicate detection over generated metadata.
//!
//! The corpus pass is exact-match only: normalize, group, flag. The
//! word-set Jaccard measure exists for targeted page-pair comparisons and
//! is never run as an all-pairs corpus scan (quadratic in page count).

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use seobot_store::PageSummary;

/// Normalize a text field for exact-match comparison: trim and lowercase.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKind {
    Title,
    Description,
}

/// A set of pages sharing one normalized title or description.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateCluster {
    #[serde(rename = "type")]
    pub kind: DuplicateKind,
    pub value: String,
    pub pages: Vec<String>,
}

/// Result of one corpus-wide exact-match pass.
#[derive(Debug, Clone, Default)]
pub struct DuplicateReport {
    /// Title clusters first, then description clusters, each in normalized
    /// value order (deterministic across runs).
    pub clusters: Vec<DuplicateCluster>,
    pub title_clusters: usize,
    pub description_clusters: usize,
    /// Every slug that is a member of at least one cluster.
    pub flagged: BTreeSet<String>,
}

/// Group the corpus by normalized title and description; any group with two
/// or more members is a duplicate cluster.
pub fn find_duplicate_clusters(pages: &[PageSummary]) -> DuplicateReport {
    let mut by_title: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut by_description: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for page in pages {
        if let Some(title) = page.meta_title.as_deref().filter(|t| !t.is_empty()) {
            by_title
                .entry(normalize_text(title))
                .or_default()
                .push(page.slug.clone());
        }
        if let Some(description) = page.meta_description.as_deref().filter(|d| !d.is_empty()) {
            by_description
                .entry(normalize_text(description))
                .or_default()
                .push(page.slug.clone());
        }
    }

    let mut report = DuplicateReport::default();

    for (value, slugs) in by_title {
        if slugs.len() > 1 {
            report.flagged.extend(slugs.iter().cloned());
            report.clusters.push(DuplicateCluster {
                kind: DuplicateKind::Title,
                value: value.chars().take(60).collect(),
                pages: slugs,
            });
            report.title_clusters += 1;
        }
    }
    for (value, slugs) in by_description {
        if slugs.len() > 1 {
            report.flagged.extend(slugs.iter().cloned());
            report.clusters.push(DuplicateCluster {
                kind: DuplicateKind::Description,
                value: value.chars().take(80).collect(),
                pages: slugs,
            });
            report.description_clusters += 1;
        }
    }

    report
}

/// Word-set Jaccard index between two text fields: intersection over union
/// of lowercased tokens longer than 2 chars. Returns a ratio in [0, 1].
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let words_a: HashSet<&str> = a.split_whitespace().filter(|w| w.len() > 2).collect();
    let words_b: HashSet<&str> = b.split_whitespace().filter(|w| w.len() > 2).collect();

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(slug: &str, title: &str, description: &str) -> PageSummary {
        PageSummary {
            slug: slug.into(),
            page_type: "city".into(),
            meta_title: Some(title.into()),
            meta_description: Some(description.into()),
            is_indexed: true,
            is_duplicate: false,
            last_generated_at: None,
        }
    }

    // -----------------------------------------------------------------------
    // exact-match clustering
    // -----------------------------------------------------------------------

    #[test]
    fn identical_titles_cluster_after_normalization() {
        let pages = vec![
            page("/a", "Dentists in Austin", "desc one"),
            page("/b", "  dentists in austin ", "desc two"),
            page("/c", "Dentists in Dallas", "desc three"),
        ];
        let report = find_duplicate_clusters(&pages);
        assert_eq!(report.title_clusters, 1);
        assert_eq!(report.description_clusters, 0);
        assert_eq!(report.clusters[0].pages, vec!["/a", "/b"]);
        assert_eq!(
            report.flagged.iter().collect::<Vec<_>>(),
            vec!["/a", "/b"]
        );
    }

    #[test]
    fn description_clusters_are_reported_separately() {
        let pages = vec![
            page("/a", "Title A", "Shared description"),
            page("/b", "Title B", "Shared description"),
            page("/c", "Title C", "Unique description"),
        ];
        let report = find_duplicate_clusters(&pages);
        assert_eq!(report.title_clusters, 0);
        assert_eq!(report.description_clusters, 1);
        assert_eq!(report.clusters[0].kind, DuplicateKind::Description);
    }

    #[test]
    fn missing_fields_do_not_cluster() {
        let mut a = page("/a", "", "");
        a.meta_title = None;
        a.meta_description = None;
        let mut b = page("/b", "", "");
        b.meta_title = None;
        b.meta_description = None;
        let report = find_duplicate_clusters(&[a, b]);
        assert!(report.clusters.is_empty());
        assert!(report.flagged.is_empty());
    }

    #[test]
    fn page_in_both_cluster_kinds_is_flagged_once() {
        let pages = vec![
            page("/a", "Same Title", "Same description"),
            page("/b", "Same Title", "Same description"),
        ];
        let report = find_duplicate_clusters(&pages);
        assert_eq!(report.clusters.len(), 2);
        assert_eq!(report.flagged.len(), 2);
    }

    // -----------------------------------------------------------------------
    // jaccard similarity
    // -----------------------------------------------------------------------

    #[test]
    fn identical_texts_score_one() {
        assert_eq!(
            jaccard_similarity("teeth whitening in austin", "teeth whitening in austin"),
            1.0
        );
    }

    #[test]
    fn disjoint_texts_score_zero() {
        assert_eq!(jaccard_similarity("teeth whitening", "root canal"), 0.0);
    }

    #[test]
    fn short_words_are_ignored() {
        // "in" and "at" fall below the length cutoff on both sides.
        assert_eq!(
            jaccard_similarity("dentists in austin", "dentists at austin"),
            1.0
        );
    }

    #[test]
    fn partial_overlap_scores_the_ratio() {
        // tokens {teeth, whitening, austin} vs {teeth, whitening, dallas}:
        // intersection 2, union 4.
        assert_eq!(
            jaccard_similarity("teeth whitening austin", "teeth whitening dallas"),
            0.5
        );
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(jaccard_similarity("", "teeth whitening"), 0.0);
        assert_eq!(jaccard_similarity("a an of", "teeth whitening"), 0.0);
    }
}
