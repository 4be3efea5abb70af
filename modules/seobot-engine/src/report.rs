//! Corpus health reporting: issue counters and the aggregate 0–100 score.

use serde::Serialize;

use seobot_store::PageSummary;

/// Title length bounds outside which a page counts as an issue.
const TITLE_MIN: usize = 30;
const TITLE_MAX_AUDIT: usize = 70;
/// Description length bounds.
const DESC_MIN: usize = 100;
const DESC_MAX_AUDIT: usize = 170;

/// The number of issue categories the health score normalizes against.
const ISSUE_CATEGORIES: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueCounts {
    pub missing_title: u32,
    pub missing_description: u32,
    pub short_title: u32,
    pub long_title: u32,
    pub short_description: u32,
    pub long_description: u32,
    pub duplicates: u32,
    pub not_indexed: u32,
}

impl IssueCounts {
    pub fn total(&self) -> u32 {
        self.missing_title
            + self.missing_description
            + self.short_title
            + self.long_title
            + self.short_description
            + self.long_description
            + self.duplicates
            + self.not_indexed
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub total_pages: usize,
    pub issues: IssueCounts,
    pub health_score: i32,
}

/// Count metadata issues across the corpus and fold them into a single
/// health score. An empty corpus is healthy by definition.
pub fn audit_pages(pages: &[PageSummary]) -> AuditReport {
    let mut issues = IssueCounts::default();

    for page in pages {
        match page.meta_title.as_deref().filter(|t| !t.is_empty()) {
            None => issues.missing_title += 1,
            Some(title) => {
                let len = title.chars().count();
                if len < TITLE_MIN {
                    issues.short_title += 1;
                } else if len > TITLE_MAX_AUDIT {
                    issues.long_title += 1;
                }
            }
        }

        match page.meta_description.as_deref().filter(|d| !d.is_empty()) {
            None => issues.missing_description += 1,
            Some(description) => {
                let len = description.chars().count();
                if len < DESC_MIN {
                    issues.short_description += 1;
                } else if len > DESC_MAX_AUDIT {
                    issues.long_description += 1;
                }
            }
        }

        if page.is_duplicate {
            issues.duplicates += 1;
        }
        if !page.is_indexed {
            issues.not_indexed += 1;
        }
    }

    let health_score = if pages.is_empty() {
        100
    } else {
        let ratio = issues.total() as f64 / (pages.len() * ISSUE_CATEGORIES) as f64;
        (((1.0 - ratio) * 100.0).round() as i32).clamp(0, 100)
    };

    AuditReport {
        total_pages: pages.len(),
        issues,
        health_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy_page(slug: &str) -> PageSummary {
        PageSummary {
            slug: slug.into(),
            page_type: "city".into(),
            meta_title: Some("Dentists in Austin, TX - Book Online Now".into()),
            meta_description: Some(
                "Looking for a dentist in Austin, TX? Explore dental clinics with verified \
                 reviews and book online today."
                    .into(),
            ),
            is_indexed: true,
            is_duplicate: false,
            last_generated_at: None,
        }
    }

    #[test]
    fn healthy_corpus_scores_100() {
        let pages = vec![healthy_page("/a"), healthy_page("/b"), healthy_page("/c")];
        let report = audit_pages(&pages);
        assert_eq!(report.issues.total(), 0);
        assert_eq!(report.health_score, 100);
    }

    #[test]
    fn empty_corpus_scores_100() {
        let report = audit_pages(&[]);
        assert_eq!(report.total_pages, 0);
        assert_eq!(report.health_score, 100);
    }

    #[test]
    fn issues_are_counted_per_category() {
        let mut missing = healthy_page("/missing");
        missing.meta_title = None;
        missing.meta_description = None;

        let mut short = healthy_page("/short");
        short.meta_title = Some("Too short".into());
        short.meta_description = Some("Also too short for a description.".into());

        let mut long = healthy_page("/long");
        long.meta_title = Some("x".repeat(80));
        long.meta_description = Some("y".repeat(200));

        let mut flagged = healthy_page("/flagged");
        flagged.is_duplicate = true;
        flagged.is_indexed = false;

        let report = audit_pages(&[missing, short, long, flagged]);
        assert_eq!(report.issues.missing_title, 1);
        assert_eq!(report.issues.missing_description, 1);
        assert_eq!(report.issues.short_title, 1);
        assert_eq!(report.issues.short_description, 1);
        assert_eq!(report.issues.long_title, 1);
        assert_eq!(report.issues.long_description, 1);
        assert_eq!(report.issues.duplicates, 1);
        assert_eq!(report.issues.not_indexed, 1);
    }

    #[test]
    fn score_is_clamped_to_zero() {
        // A single page with every category tripped pushes the raw formula
        // toward its floor; the score must never go negative.
        let mut page = healthy_page("/bad");
        page.meta_title = Some("x".into());
        page.meta_description = Some("y".into());
        page.is_duplicate = true;
        page.is_indexed = false;

        let report = audit_pages(&[page]);
        assert!(report.health_score >= 0);
        assert!(report.health_score <= 100);
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let mut page = healthy_page("/empty");
        page.meta_title = Some(String::new());
        let report = audit_pages(&[page]);
        assert_eq!(report.issues.missing_title, 1);
    }
}
