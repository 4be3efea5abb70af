//! Metadata synthesis: pure, deterministic text generation per page.
//!
//! Phrase variety comes from seeded selection keyed on the page's seed
//! string, never from a PRNG: the same slug must produce the same phrase on
//! every run, because duplicate detection depends on content varying across
//! pages while the hash-based change check depends on it never drifting
//! between runs for the same page.

use seobot_common::PageType;

use crate::pagespace::PageContext;

/// Hard cap on generated titles.
pub const TITLE_MAX: usize = 60;
/// Hard cap on generated meta descriptions.
pub const DESC_MAX: usize = 155;

const SITE_NAME: &str = "AppointPanda";

// Synonym pools for title/description variety.
const TITLE_MODIFIERS: [&str; 7] = [
    "Top",
    "Best-Rated",
    "Trusted",
    "Experienced",
    "Licensed",
    "Verified",
    "Expert",
];
const DESC_OPENERS: [&str; 7] = [
    "Looking for",
    "Need",
    "Find",
    "Search for",
    "Discover",
    "Connect with",
    "Book appointments with",
];
const DESC_CLOSERS: [&str; 6] = [
    "Book online today.",
    "Schedule your visit now.",
    "Free consultations available.",
    "Compare reviews and book.",
    "Same-day appointments possible.",
    "Verified professionals.",
];

/// Generated metadata triple for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub h1: String,
}

/// Map a seed string plus a small salt to a stable index into a list of
/// `len` choices. Order-dependent character-sum hash on wrapping i32
/// arithmetic; deliberately not a general PRNG (reproducibility across runs
/// is a correctness requirement here, not an implementation detail).
pub fn seeded_index(seed: &str, salt: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let mut hash: i32 = 0;
    for c in seed.chars() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(c as i32)
            .wrapping_add(salt);
    }
    hash.unsigned_abs() as usize % len
}

fn pick<'a>(list: &[&'a str], seed: &str, salt: i32) -> &'a str {
    list[seeded_index(seed, salt, list.len())]
}

/// Truncate at a word boundary to `max_len` chars, appending an ellipsis.
/// The boundary must fall past `min_break` chars; very short prefixes are
/// cut mid-word instead of collapsing to almost nothing.
fn truncate_at_word(text: &str, max_len: usize, min_break: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        return text.to_string();
    }
    let cut = &chars[..max_len - 3];
    let cut_at = match cut.iter().rposition(|c| *c == ' ') {
        Some(pos) if pos > min_break => pos,
        _ => cut.len(),
    };
    let mut out: String = chars[..cut_at].iter().collect();
    out.push_str("...");
    out
}

pub fn truncate_title(title: &str) -> String {
    truncate_at_word(title, TITLE_MAX, 20)
}

pub fn truncate_description(description: &str) -> String {
    truncate_at_word(description, DESC_MAX, 50)
}

/// Fingerprint of the (title, description, h1) triple, used to detect
/// whether regeneration actually changed anything. 32-bit string hash in
/// sign-preserving hex.
pub fn metadata_hash(title: &str, description: &str, h1: &str) -> String {
    let joined = format!("{title}|{description}|{h1}");
    let mut hash: i32 = 0;
    for c in joined.chars() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(c as i32);
    }
    if hash < 0 {
        format!("-{:x}", hash.unsigned_abs())
    } else {
        format!("{hash:x}")
    }
}

/// Synthesize the full metadata triple for one page. Pure and
/// deterministic: identical (page_type, ctx) always yields identical output.
pub fn synthesize(page_type: PageType, ctx: &PageContext) -> Metadata {
    Metadata {
        title: generate_title(page_type, ctx),
        description: generate_description(page_type, ctx),
        h1: generate_h1(page_type, ctx),
    }
}

/// "{City}, {ST}" when the state abbreviation resolved, else just the name.
fn location(name: &str, state_abbr: Option<&str>) -> String {
    match state_abbr {
        Some(abbr) => format!("{name}, {abbr}"),
        None => name.to_string(),
    }
}

pub fn generate_title(page_type: PageType, ctx: &PageContext) -> String {
    let name = ctx.name.as_str();
    let title = match page_type {
        PageType::State => {
            let modifier = pick(&TITLE_MODIFIERS, &ctx.seed, 0);
            format!("{modifier} Dentists in {name}")
        }
        PageType::City => {
            let loc = location(name, ctx.state_abbr.as_deref());
            format!("Dentists in {loc} - Book Online")
        }
        PageType::Treatment => format!("{name} - Find Dental Providers"),
        PageType::CityTreatment => {
            // Seeded modifier keeps combo titles distinct from their h1
            // and from each other across thousands of city/treatment pairs.
            let modifier = pick(&TITLE_MODIFIERS, &ctx.seed, 0);
            let city = ctx.city_name.as_deref().unwrap_or_default();
            let loc = location(city, ctx.state_abbr.as_deref());
            format!("{modifier} {name} in {loc}")
        }
        PageType::Clinic => match (ctx.city_name.as_deref(), ctx.state_abbr.as_deref()) {
            (Some(city), Some(abbr)) => format!("{name} - {city}, {abbr}"),
            _ => name.to_string(),
        },
        PageType::Dentist => {
            let mut title = name.to_string();
            if let Some(specialty) = &ctx.specialty {
                title.push_str(&format!(", {specialty}"));
            }
            if let Some(city) = &ctx.city_name {
                title.push_str(&format!(" in {city}"));
            }
            title
        }
        PageType::Blog => format!("{name} | Dental Tips"),
        PageType::Static => {
            let base = static_copy(&ctx.seed)
                .map(|copy| copy.title_base.to_string())
                .unwrap_or_else(|| title_from_slug(&ctx.seed));
            format!("{base} | {SITE_NAME}")
        }
    };
    truncate_title(&title)
}

pub fn generate_description(page_type: PageType, ctx: &PageContext) -> String {
    let name = ctx.name.as_str();
    let opener = pick(&DESC_OPENERS, &ctx.seed, 0);
    let closer = pick(&DESC_CLOSERS, &ctx.seed, 1);
    let closer_lc = closer.to_lowercase();

    let description = match page_type {
        PageType::State => format!(
            "{opener} dentists in {name}? Browse verified dental professionals, compare ratings and {closer_lc}"
        ),
        PageType::City => {
            let loc = location(name, ctx.state_abbr.as_deref());
            format!(
                "{opener} a dentist in {loc}? Explore dental clinics with verified reviews and {closer_lc}"
            )
        }
        PageType::Treatment => format!(
            "Learn about {} treatment. Find qualified providers, compare costs, and book online.",
            name.to_lowercase()
        ),
        PageType::CityTreatment => {
            let city = ctx.city_name.as_deref().unwrap_or_default();
            let loc = location(city, ctx.state_abbr.as_deref());
            format!(
                "{opener} {} in {loc}? Compare providers, read reviews and {closer_lc}",
                name.to_lowercase()
            )
        }
        PageType::Clinic => {
            let loc = ctx
                .city_name
                .as_deref()
                .map(|city| format!(" in {city}"))
                .unwrap_or_default();
            format!(
                "{name}{loc} - View services, patient reviews, hours and contact info. {closer}"
            )
        }
        PageType::Dentist => {
            let specialty = ctx
                .specialty
                .as_deref()
                .map(|s| format!(", {s}"))
                .unwrap_or_default();
            format!("{name}{specialty} - Read patient reviews and {closer_lc}")
        }
        PageType::Blog => match &ctx.excerpt {
            Some(excerpt) => excerpt.clone(),
            None => format!(
                "{name} - Expert dental health advice and tips from verified professionals."
            ),
        },
        PageType::Static => static_copy(&ctx.seed)
            .map(|copy| copy.description.to_string())
            .unwrap_or_else(|| {
                format!("{name} - {SITE_NAME} helps you find trusted dentists online.")
            }),
    };
    truncate_description(&description)
}

pub fn generate_h1(page_type: PageType, ctx: &PageContext) -> String {
    let name = ctx.name.as_str();
    match page_type {
        PageType::State => format!("Dentists in {name}"),
        PageType::City => {
            let loc = location(name, ctx.state_abbr.as_deref());
            format!("Find a Dentist in {loc}")
        }
        PageType::Treatment => format!("{name} Dental Services"),
        PageType::CityTreatment => {
            let city = ctx.city_name.as_deref().unwrap_or_default();
            let loc = location(city, ctx.state_abbr.as_deref());
            format!("{name} in {loc}")
        }
        // Clinic pages deliberately head with the bare clinic name.
        PageType::Clinic => name.to_string(),
        PageType::Dentist => match &ctx.person_title {
            Some(person_title) => format!("{person_title} {name}"),
            None => name.to_string(),
        },
        PageType::Blog => name.to_string(),
        PageType::Static => static_copy(&ctx.seed)
            .map(|copy| copy.h1.to_string())
            .unwrap_or_else(|| name.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Static page copy
// ---------------------------------------------------------------------------

struct StaticCopy {
    title_base: &'static str,
    description: &'static str,
    h1: &'static str,
}

/// Hand-written copy for the known marketing-site paths. Unknown paths fall
/// back to generated defaults.
fn static_copy(path: &str) -> Option<StaticCopy> {
    let (title_base, description, h1) = match path {
        "/" => (
            "Find & Book Trusted Dentists",
            "Find and book trusted dentists near you. Compare reviews and schedule appointments online.",
            "Find Your Perfect Dentist",
        ),
        "/services" => (
            "Dental Services & Treatments",
            "Browse dental services from cleanings to implants. Find providers in your area.",
            "Dental Services & Treatments",
        ),
        "/blog" => (
            "Dental Health Blog",
            "Expert dental health tips and oral care advice from verified professionals.",
            "Dental Health Insights",
        ),
        "/insurance" => (
            "Dental Insurance Guide",
            "Find dentists that accept your insurance. Compare in-network providers.",
            "Dental Insurance Guide",
        ),
        "/about" => (
            "About Us",
            "AppointPanda connects patients with verified dental professionals.",
            "About AppointPanda",
        ),
        "/contact" => (
            "Contact Us",
            "Get in touch with AppointPanda. Questions about booking or listings?",
            "Contact AppointPanda",
        ),
        "/faq" => (
            "Frequently Asked Questions",
            "FAQs about AppointPanda. Learn how to find dentists and book appointments.",
            "Your Questions, Answered",
        ),
        "/how-it-works" => (
            "How It Works",
            "Book a dentist in 3 easy steps. Search, compare, and schedule online.",
            "How AppointPanda Works",
        ),
        "/pricing" => (
            "Pricing for Practices",
            "Transparent pricing for dental practices. List your clinic on AppointPanda.",
            "Pricing for Dental Practices",
        ),
        "/privacy" => (
            "Privacy Policy",
            "Learn how AppointPanda protects your personal information and data.",
            "Our Privacy Policy",
        ),
        "/terms" => (
            "Terms of Service",
            "Terms of service for AppointPanda platform users.",
            "Our Terms of Service",
        ),
        "/sitemap" => (
            "Site Directory",
            "Browse all pages on AppointPanda. Find dentists by location or service.",
            "Browse the Site Directory",
        ),
        _ => return None,
    };
    Some(StaticCopy {
        title_base,
        description,
        h1,
    })
}

/// Title-case the last path segment of a slug ("/teeth-whitening" →
/// "Teeth Whitening"), used when no hand-written copy exists.
pub fn title_from_slug(slug: &str) -> String {
    let segment = slug.split('/').filter(|s| !s.is_empty()).next_back();
    match segment {
        Some(segment) => segment
            .split('-')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
        None => "Home".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagespace::PageContext;

    fn city_ctx() -> PageContext {
        PageContext {
            seed: "austin".into(),
            name: "Austin".into(),
            state_name: Some("Texas".into()),
            state_abbr: Some("TX".into()),
            ..PageContext::default()
        }
    }

    // -----------------------------------------------------------------------
    // seeded_index
    // -----------------------------------------------------------------------

    #[test]
    fn seeded_index_is_stable() {
        let first = seeded_index("teeth-whitening-austin", 0, 7);
        for _ in 0..10 {
            assert_eq!(seeded_index("teeth-whitening-austin", 0, 7), first);
        }
    }

    #[test]
    fn seeded_index_stays_in_range() {
        for seed in ["", "a", "austin", "a-very-long-seed-string-with-many-words"] {
            for salt in 0..3 {
                assert!(seeded_index(seed, salt, 7) < 7);
            }
        }
    }

    #[test]
    fn seeded_index_varies_with_salt() {
        let indices: Vec<usize> = (0..20).map(|salt| seeded_index("austin", salt, 7)).collect();
        assert!(indices.iter().any(|i| *i != indices[0]));
    }

    // -----------------------------------------------------------------------
    // truncation
    // -----------------------------------------------------------------------

    #[test]
    fn short_title_is_untouched() {
        assert_eq!(truncate_title("Dentists in Austin"), "Dentists in Austin");
    }

    #[test]
    fn long_title_truncates_at_word_boundary_with_ellipsis() {
        let long = "Comprehensive Orthodontic and Cosmetic Dentistry Services in Greater Austin";
        let truncated = truncate_title(long);
        assert!(truncated.chars().count() <= TITLE_MAX);
        assert!(truncated.ends_with("..."));
        let body = truncated.trim_end_matches("...");
        assert!(!body.ends_with(' '));
        assert!(long.starts_with(body));
        // The cut must not split a word: the char after the body is a space.
        let next = long.chars().nth(body.chars().count()).unwrap();
        assert_eq!(next, ' ');
    }

    #[test]
    fn unbroken_title_is_cut_mid_word() {
        let long = "a".repeat(80);
        let truncated = truncate_title(&long);
        assert_eq!(truncated.chars().count(), TITLE_MAX);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn long_description_respects_bound() {
        let long = "word ".repeat(60);
        let truncated = truncate_description(&long);
        assert!(truncated.chars().count() <= DESC_MAX);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncation_is_char_safe_for_multibyte_text() {
        let long = "Zahnärzte und Kieferorthopäden für ästhetische Zahnmedizin in Köln und Umgebung";
        let truncated = truncate_title(&long.repeat(2));
        assert!(truncated.chars().count() <= TITLE_MAX);
    }

    // -----------------------------------------------------------------------
    // synthesis
    // -----------------------------------------------------------------------

    #[test]
    fn synthesis_is_deterministic() {
        let ctx = city_ctx();
        let first = synthesize(PageType::City, &ctx);
        let second = synthesize(PageType::City, &ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn city_title_includes_state_abbr() {
        let meta = synthesize(PageType::City, &city_ctx());
        assert_eq!(meta.title, "Dentists in Austin, TX - Book Online");
    }

    #[test]
    fn city_without_state_abbr_degrades_gracefully() {
        let ctx = PageContext {
            seed: "austin".into(),
            name: "Austin".into(),
            ..PageContext::default()
        };
        let meta = synthesize(PageType::City, &ctx);
        assert_eq!(meta.title, "Dentists in Austin - Book Online");
        assert!(!meta.description.contains(", "));
    }

    #[test]
    fn h1_differs_from_title_for_templated_types() {
        let combo_ctx = PageContext {
            seed: "austin-teeth-whitening".into(),
            name: "Teeth Whitening".into(),
            city_name: Some("Austin".into()),
            state_abbr: Some("TX".into()),
            ..PageContext::default()
        };
        let state_ctx = PageContext {
            seed: "texas".into(),
            name: "Texas".into(),
            state_abbr: Some("TX".into()),
            ..PageContext::default()
        };
        let treatment_ctx = PageContext {
            seed: "dental-implants".into(),
            name: "Dental Implants".into(),
            ..PageContext::default()
        };

        for (page_type, ctx) in [
            (PageType::City, &city_ctx()),
            (PageType::CityTreatment, &combo_ctx),
            (PageType::State, &state_ctx),
            (PageType::Treatment, &treatment_ctx),
        ] {
            let meta = synthesize(page_type, ctx);
            assert_ne!(meta.title, meta.h1, "{page_type} h1 must differ from title");
        }
    }

    #[test]
    fn clinic_h1_is_the_bare_name() {
        let ctx = PageContext {
            seed: "bright-smiles".into(),
            name: "Bright Smiles Dental".into(),
            city_name: Some("Austin".into()),
            state_abbr: Some("TX".into()),
            ..PageContext::default()
        };
        let meta = synthesize(PageType::Clinic, &ctx);
        assert_eq!(meta.h1, "Bright Smiles Dental");
        assert_eq!(meta.title, "Bright Smiles Dental - Austin, TX");
    }

    #[test]
    fn dentist_context_degrades_without_placeholders() {
        let ctx = PageContext {
            seed: "jane-doe".into(),
            name: "Jane Doe".into(),
            ..PageContext::default()
        };
        let meta = synthesize(PageType::Dentist, &ctx);
        assert_eq!(meta.title, "Jane Doe");
        assert!(!meta.description.contains("undefined"));
        assert!(!meta.description.contains("  "));
    }

    #[test]
    fn blog_description_prefers_excerpt() {
        let ctx = PageContext {
            seed: "flossing-guide".into(),
            name: "The Complete Flossing Guide".into(),
            excerpt: Some("Everything you need to know about flossing.".into()),
            ..PageContext::default()
        };
        let meta = synthesize(PageType::Blog, &ctx);
        assert_eq!(
            meta.description,
            "Everything you need to know about flossing."
        );
    }

    #[test]
    fn known_static_path_uses_handwritten_copy() {
        let ctx = PageContext {
            seed: "/faq".into(),
            name: "Faq".into(),
            ..PageContext::default()
        };
        let meta = synthesize(PageType::Static, &ctx);
        assert_eq!(meta.title, "Frequently Asked Questions | AppointPanda");
        assert_eq!(meta.h1, "Your Questions, Answered");
    }

    #[test]
    fn unknown_static_path_falls_back_to_slug_title() {
        let ctx = PageContext {
            seed: "/for-dentists".into(),
            name: "For Dentists".into(),
            ..PageContext::default()
        };
        let meta = synthesize(PageType::Static, &ctx);
        assert_eq!(meta.title, "For Dentists | AppointPanda");
    }

    #[test]
    fn title_from_slug_title_cases_segments() {
        assert_eq!(title_from_slug("/how-it-works"), "How It Works");
        assert_eq!(title_from_slug("/"), "Home");
    }

    // -----------------------------------------------------------------------
    // metadata_hash
    // -----------------------------------------------------------------------

    #[test]
    fn hash_is_stable_for_identical_triples() {
        let a = metadata_hash("Title", "Description", "Heading");
        let b = metadata_hash("Title", "Description", "Heading");
        assert_eq!(a, b);
    }

    #[test]
    fn hash_changes_when_any_field_changes() {
        let base = metadata_hash("Title", "Description", "Heading");
        assert_ne!(base, metadata_hash("Title!", "Description", "Heading"));
        assert_ne!(base, metadata_hash("Title", "Description!", "Heading"));
        assert_ne!(base, metadata_hash("Title", "Description", "Heading!"));
    }
}
