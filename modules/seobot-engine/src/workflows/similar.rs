//! Targeted near-duplicate query: score one page against a bounded
//! candidate set with the word-set Jaccard measure. Deliberately not an
//! all-pairs corpus scan.

use std::cmp::Ordering;

use anyhow::Result;
use serde::Serialize;

use seobot_common::{BotSettings, SeoBotError};

use crate::dedup::jaccard_similarity;
use crate::traits::SeoStore;

/// Upper bound on candidates scored per query.
pub const CANDIDATE_CAP: usize = 2000;

#[derive(Debug, Clone, Serialize)]
pub struct SimilarMatch {
    pub slug: String,
    pub title_similarity: f64,
    pub description_similarity: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarOutcome {
    pub slug: String,
    pub candidates_checked: usize,
    pub matches: Vec<SimilarMatch>,
}

pub async fn similar_pages(
    store: &dyn SeoStore,
    slug: &str,
    limit: usize,
    settings: &BotSettings,
) -> Result<SimilarOutcome> {
    let target = store
        .pages_by_slugs(&[slug.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| SeoBotError::NotFound(format!("No page for slug {slug}")))?;

    let target_title = target.meta_title.clone().unwrap_or_default();
    let target_description = target.meta_description.clone().unwrap_or_default();

    // Same-type pages share templates, so that's where near-duplicates live.
    let summaries = store.page_summaries().await?;
    let candidates: Vec<_> = summaries
        .iter()
        .filter(|page| page.slug != target.slug && page.page_type == target.page_type)
        .take(CANDIDATE_CAP)
        .collect();
    let candidates_checked = candidates.len();

    let mut matches: Vec<SimilarMatch> = candidates
        .into_iter()
        .map(|page| {
            let title_similarity =
                jaccard_similarity(&target_title, page.meta_title.as_deref().unwrap_or(""));
            let description_similarity = jaccard_similarity(
                &target_description,
                page.meta_description.as_deref().unwrap_or(""),
            );
            SimilarMatch {
                slug: page.slug.clone(),
                title_similarity,
                description_similarity,
                score: title_similarity.max(description_similarity),
            }
        })
        .filter(|m| m.score >= settings.title_similarity_threshold)
        .collect();

    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    matches.truncate(limit);

    Ok(SimilarOutcome {
        slug: target.slug,
        candidates_checked,
        matches,
    })
}
