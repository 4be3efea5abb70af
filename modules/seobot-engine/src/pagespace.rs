//! Page-space enumeration: expands the loaded entity sets into every
//! addressable page identity.
//!
//! The city×treatment cartesian product dominates the corpus (thousands of
//! pages for a modest directory), so `seeds()` is a lazy iterator: the full
//! list is never materialized here. `expected_counts()` reports the same
//! totals arithmetically so callers can size a run before streaming it.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use seobot_common::PageType;
use seobot_store::{City, EntitySets, State};

use crate::synth::title_from_slug;

/// The fixed marketing-site paths that always get a page record.
pub const STATIC_PAGES: [&str; 12] = [
    "/",
    "/services",
    "/blog",
    "/insurance",
    "/about",
    "/contact",
    "/faq",
    "/how-it-works",
    "/pricing",
    "/privacy",
    "/terms",
    "/sitemap",
];

/// Synthesis inputs for one page. Absent fields mean the parent
/// relationship did not resolve; templates omit the clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    /// Stable seed for phrase selection (usually the entity slug).
    pub seed: String,
    pub name: String,
    pub city_name: Option<String>,
    pub state_name: Option<String>,
    pub state_abbr: Option<String>,
    pub person_title: Option<String>,
    pub specialty: Option<String>,
    pub excerpt: Option<String>,
}

/// One enumerated page identity, ready for synthesis.
#[derive(Debug, Clone)]
pub struct PageSeed {
    pub slug: String,
    pub page_type: PageType,
    pub ctx: PageContext,
}

/// Per-type page counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub states: usize,
    pub cities: usize,
    pub treatments: usize,
    pub city_treatment_combos: usize,
    pub clinics: usize,
    pub dentists: usize,
    pub blog: usize,
    #[serde(rename = "static")]
    pub static_pages: usize,
}

impl Breakdown {
    pub fn total(&self) -> usize {
        self.states
            + self.cities
            + self.treatments
            + self.city_treatment_combos
            + self.clinics
            + self.dentists
            + self.blog
            + self.static_pages
    }
}

/// The full addressable page space for one entity snapshot.
pub struct PageSpace {
    entities: EntitySets,
    /// Cities whose parent state resolved, in load order. Orphan cities are
    /// excluded outright: their slug needs the state path segment.
    resolved_cities: Vec<(City, State)>,
    /// clinic id → resolved (city, state), for clinic and dentist context.
    clinic_city: HashMap<Uuid, (City, State)>,
}

impl PageSpace {
    pub fn new(entities: EntitySets) -> Self {
        let state_by_id: HashMap<Uuid, &State> =
            entities.states.iter().map(|s| (s.id, s)).collect();

        let resolved_cities: Vec<(City, State)> = entities
            .cities
            .iter()
            .filter_map(|city| {
                state_by_id
                    .get(&city.state_id)
                    .map(|state| (city.clone(), (*state).clone()))
            })
            .collect();

        let city_by_id: HashMap<Uuid, &(City, State)> = resolved_cities
            .iter()
            .map(|pair| (pair.0.id, pair))
            .collect();

        let clinic_city: HashMap<Uuid, (City, State)> = entities
            .clinics
            .iter()
            .filter_map(|clinic| {
                let city_id = clinic.city_id?;
                city_by_id.get(&city_id).map(|pair| (clinic.id, (*pair).clone()))
            })
            .collect();

        Self {
            entities,
            resolved_cities,
            clinic_city,
        }
    }

    /// Per-type counts of the pages `seeds()` will yield.
    pub fn expected_counts(&self) -> Breakdown {
        Breakdown {
            states: self.entities.states.len(),
            cities: self.resolved_cities.len(),
            treatments: self.entities.treatments.len(),
            city_treatment_combos: self.resolved_cities.len() * self.entities.treatments.len(),
            clinics: self.entities.clinics.len(),
            dentists: self.entities.dentists.len(),
            blog: self.entities.posts.len(),
            static_pages: STATIC_PAGES.len(),
        }
    }

    /// Lazily enumerate every page seed: statics, states, cities,
    /// treatments, city×treatment combos, clinics, dentists, blog posts.
    pub fn seeds(&self) -> impl Iterator<Item = PageSeed> + '_ {
        let statics = STATIC_PAGES.iter().map(|path| PageSeed {
            slug: path.to_string(),
            page_type: PageType::Static,
            ctx: PageContext {
                seed: path.to_string(),
                name: title_from_slug(path),
                ..PageContext::default()
            },
        });

        let states = self.entities.states.iter().map(|state| PageSeed {
            slug: format!("/{}", state.slug),
            page_type: PageType::State,
            ctx: PageContext {
                seed: state.slug.clone(),
                name: state.name.clone(),
                state_abbr: Some(state.abbreviation.clone()),
                ..PageContext::default()
            },
        });

        let cities = self.resolved_cities.iter().map(|(city, state)| PageSeed {
            slug: format!("/{}/{}", state.slug, city.slug),
            page_type: PageType::City,
            ctx: PageContext {
                seed: city.slug.clone(),
                name: city.name.clone(),
                state_name: Some(state.name.clone()),
                state_abbr: Some(state.abbreviation.clone()),
                ..PageContext::default()
            },
        });

        let treatments = self.entities.treatments.iter().map(|treatment| PageSeed {
            slug: format!("/services/{}", treatment.slug),
            page_type: PageType::Treatment,
            ctx: PageContext {
                seed: treatment.slug.clone(),
                name: treatment.name.clone(),
                ..PageContext::default()
            },
        });

        // The dominant volume driver: every resolvable city crossed with
        // every treatment, each combo carrying the city's state context.
        let combos = self.resolved_cities.iter().flat_map(move |(city, state)| {
            self.entities.treatments.iter().map(move |treatment| PageSeed {
                slug: format!("/{}/{}/{}", state.slug, city.slug, treatment.slug),
                page_type: PageType::CityTreatment,
                ctx: PageContext {
                    seed: format!("{}-{}", city.slug, treatment.slug),
                    name: treatment.name.clone(),
                    city_name: Some(city.name.clone()),
                    state_name: Some(state.name.clone()),
                    state_abbr: Some(state.abbreviation.clone()),
                    ..PageContext::default()
                },
            })
        });

        let clinics = self.entities.clinics.iter().map(|clinic| {
            let resolved = self.clinic_city.get(&clinic.id);
            PageSeed {
                slug: format!("/clinic/{}", clinic.slug),
                page_type: PageType::Clinic,
                ctx: PageContext {
                    seed: clinic.slug.clone(),
                    name: clinic.name.clone(),
                    city_name: resolved.map(|(city, _)| city.name.clone()),
                    state_abbr: resolved.map(|(_, state)| state.abbreviation.clone()),
                    ..PageContext::default()
                },
            }
        });

        let dentists = self.entities.dentists.iter().map(|dentist| {
            let city = dentist
                .clinic_id
                .and_then(|clinic_id| self.clinic_city.get(&clinic_id));
            PageSeed {
                slug: format!("/dentist/{}", dentist.slug),
                page_type: PageType::Dentist,
                ctx: PageContext {
                    seed: dentist.slug.clone(),
                    name: dentist.name.clone(),
                    person_title: dentist.title.clone(),
                    specialty: dentist.specializations.first().cloned(),
                    city_name: city.map(|(city, _)| city.name.clone()),
                    ..PageContext::default()
                },
            }
        });

        let posts = self.entities.posts.iter().map(|post| PageSeed {
            slug: format!("/blog/{}", post.slug),
            page_type: PageType::Blog,
            ctx: PageContext {
                seed: post.slug.clone(),
                name: post.title.clone(),
                excerpt: post.excerpt.clone(),
                ..PageContext::default()
            },
        });

        statics
            .chain(states)
            .chain(cities)
            .chain(treatments)
            .chain(combos)
            .chain(clinics)
            .chain(dentists)
            .chain(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use seobot_store::{BlogPost, Clinic, Dentist, Treatment};

    fn state(slug: &str, name: &str, abbr: &str) -> State {
        State {
            id: Uuid::new_v4(),
            slug: slug.into(),
            name: name.into(),
            abbreviation: abbr.into(),
        }
    }

    fn city(slug: &str, name: &str, state_id: Uuid) -> City {
        City {
            id: Uuid::new_v4(),
            slug: slug.into(),
            name: name.into(),
            state_id,
        }
    }

    fn treatment(slug: &str, name: &str) -> Treatment {
        Treatment {
            id: Uuid::new_v4(),
            slug: slug.into(),
            name: name.into(),
        }
    }

    fn sample_entities() -> EntitySets {
        let texas = state("texas", "Texas", "TX");
        let florida = state("florida", "Florida", "FL");
        let austin = city("austin", "Austin", texas.id);
        let dallas = city("dallas", "Dallas", texas.id);
        let miami = city("miami", "Miami", florida.id);
        EntitySets {
            cities: vec![austin, dallas, miami],
            states: vec![texas, florida],
            treatments: vec![
                treatment("teeth-whitening", "Teeth Whitening"),
                treatment("dental-implants", "Dental Implants"),
            ],
            clinics: vec![],
            dentists: vec![],
            posts: vec![],
        }
    }

    #[test]
    fn full_scenario_counts() {
        // 2 states, 3 resolvable cities, 2 treatments → 6 combos.
        let space = PageSpace::new(sample_entities());
        let counts = space.expected_counts();
        assert_eq!(counts.states, 2);
        assert_eq!(counts.cities, 3);
        assert_eq!(counts.treatments, 2);
        assert_eq!(counts.city_treatment_combos, 6);
        assert_eq!(counts.total(), STATIC_PAGES.len() + 2 + 3 + 2 + 6);
        assert_eq!(space.seeds().count(), counts.total());
    }

    #[test]
    fn slugs_are_unique_across_the_whole_space() {
        let mut entities = sample_entities();
        entities.clinics = vec![Clinic {
            id: Uuid::new_v4(),
            slug: "bright-smiles".into(),
            name: "Bright Smiles Dental".into(),
            city_id: Some(entities.cities[0].id),
        }];
        entities.dentists = vec![Dentist {
            id: Uuid::new_v4(),
            slug: "jane-doe".into(),
            name: "Jane Doe".into(),
            title: Some("Dr.".into()),
            specializations: vec!["Orthodontics".into()],
            clinic_id: Some(entities.clinics[0].id),
        }];
        entities.posts = vec![BlogPost {
            id: Uuid::new_v4(),
            slug: "flossing-guide".into(),
            title: "The Complete Flossing Guide".into(),
            excerpt: None,
        }];

        let space = PageSpace::new(entities);
        let slugs: Vec<String> = space.seeds().map(|seed| seed.slug).collect();
        let unique: HashSet<&String> = slugs.iter().collect();
        assert_eq!(slugs.len(), unique.len());
    }

    #[test]
    fn orphan_city_is_excluded_from_cities_and_combos() {
        let mut entities = sample_entities();
        // City pointing at a state id that does not exist.
        entities
            .cities
            .push(city("ghost-town", "Ghost Town", Uuid::new_v4()));

        let space = PageSpace::new(entities);
        let counts = space.expected_counts();
        assert_eq!(counts.cities, 3);
        assert_eq!(counts.city_treatment_combos, 6);
        assert!(space.seeds().all(|seed| !seed.slug.contains("ghost-town")));
    }

    #[test]
    fn clinic_without_city_keeps_degraded_context() {
        let mut entities = sample_entities();
        entities.clinics = vec![Clinic {
            id: Uuid::new_v4(),
            slug: "orphan-clinic".into(),
            name: "Orphan Clinic".into(),
            city_id: None,
        }];

        let space = PageSpace::new(entities);
        let clinic_seed = space
            .seeds()
            .find(|seed| seed.page_type == PageType::Clinic)
            .unwrap();
        assert_eq!(clinic_seed.slug, "/clinic/orphan-clinic");
        assert_eq!(clinic_seed.ctx.city_name, None);
        assert_eq!(clinic_seed.ctx.state_abbr, None);
    }

    #[test]
    fn dentist_carries_clinic_city_transitively() {
        let mut entities = sample_entities();
        let austin_id = entities.cities[0].id;
        entities.clinics = vec![Clinic {
            id: Uuid::new_v4(),
            slug: "bright-smiles".into(),
            name: "Bright Smiles Dental".into(),
            city_id: Some(austin_id),
        }];
        entities.dentists = vec![Dentist {
            id: Uuid::new_v4(),
            slug: "jane-doe".into(),
            name: "Jane Doe".into(),
            title: None,
            specializations: vec![],
            clinic_id: Some(entities.clinics[0].id),
        }];

        let space = PageSpace::new(entities);
        let dentist_seed = space
            .seeds()
            .find(|seed| seed.page_type == PageType::Dentist)
            .unwrap();
        assert_eq!(dentist_seed.ctx.city_name.as_deref(), Some("Austin"));
        assert_eq!(dentist_seed.ctx.specialty, None);
    }

    #[test]
    fn combo_slugs_carry_state_city_treatment_path() {
        let space = PageSpace::new(sample_entities());
        let combo_slugs: HashSet<String> = space
            .seeds()
            .filter(|seed| seed.page_type == PageType::CityTreatment)
            .map(|seed| seed.slug)
            .collect();
        assert!(combo_slugs.contains("/texas/austin/teeth-whitening"));
        assert!(combo_slugs.contains("/florida/miami/dental-implants"));
        assert_eq!(combo_slugs.len(), 6);
    }
}
