use std::collections::HashSet;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::graph::{Catalog, FocusKind, FocusRef};

pub const DEFAULT_RESULT_LIMIT: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchEntry {
    pub kind: FocusKind,
    pub id: String,
    pub display_name: String,
    /// Secondary text shown next to the name (a service's domain, a dependency's user count).
    pub detail: Option<String>,
    name_lower: String,
}

impl SearchEntry {
    fn new(kind: FocusKind, id: &str, display_name: &str, detail: Option<String>) -> Self {
        Self {
            kind,
            id: id.to_owned(),
            display_name: display_name.to_owned(),
            detail,
            name_lower: display_name.to_lowercase(),
        }
    }

    pub fn focus_ref(&self) -> FocusRef {
        FocusRef::new(self.kind, self.id.clone(), self.display_name.clone())
    }
}

/// Lookup over service, domain and dependency names, deduplicated by `(kind, id)`.
#[derive(Clone, Debug, Default)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let mut seen: HashSet<(FocusKind, String)> = HashSet::new();
        let mut entries = Vec::new();

        for service in &catalog.services {
            if seen.insert((FocusKind::Service, service.id.clone())) {
                entries.push(SearchEntry::new(
                    FocusKind::Service,
                    &service.id,
                    service.display_name(),
                    service.domain().map(str::to_owned),
                ));
            }
        }

        for service in &catalog.services {
            if let Some(domain) = service.domain()
                && seen.insert((FocusKind::Domain, domain.to_ascii_lowercase()))
            {
                entries.push(SearchEntry::new(FocusKind::Domain, domain, domain, None));
            }
        }

        for service in &catalog.services {
            for dependency in &service.dependencies {
                if seen.insert((FocusKind::Dependency, dependency.name.clone())) {
                    let users = catalog
                        .services
                        .iter()
                        .filter(|other| {
                            other
                                .dependencies
                                .iter()
                                .any(|link| link.name == dependency.name)
                        })
                        .count();
                    entries.push(SearchEntry::new(
                        FocusKind::Dependency,
                        &dependency.name,
                        &dependency.name,
                        Some(format!("{users} services")),
                    ));
                }
            }
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    /// Case-insensitive substring match on display names. Prefix matches rank first, then the
    /// fuzzy score, then the name.
    pub fn query(&self, text: &str, limit: usize) -> Vec<&SearchEntry> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let matcher = SkimMatcherV2::default();
        let mut hits = self
            .entries
            .iter()
            .filter_map(|entry| {
                let position = entry.name_lower.find(&needle)?;
                let score = matcher
                    .fuzzy_match(&entry.name_lower, &needle)
                    .unwrap_or_default();
                Some((position != 0, -score, entry))
            })
            .collect::<Vec<_>>();

        hits.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.display_name.cmp(&b.2.display_name))
                .then_with(|| a.2.kind.cmp(&b.2.kind))
        });
        hits.truncate(limit);
        hits.into_iter().map(|(_, _, entry)| entry).collect()
    }
}
