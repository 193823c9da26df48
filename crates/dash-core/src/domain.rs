//! Domain derivation for tasks.

use crate::model::{Domain, Task};

/// Keywords that imply a domain when they appear as a category or label.
const KEYWORD_DOMAINS: &[(&str, Domain)] = &[
    ("job", Domain::Work),
    ("office", Domain::Work),
    ("client", Domain::Work),
    ("ministry", Domain::Church),
    ("worship", Domain::Church),
    ("congregation", Domain::Church),
    ("home", Domain::Personal),
    ("family", Domain::Personal),
    ("health", Domain::Personal),
];

fn classify_tag(tag: &str) -> Option<Domain> {
    if let Ok(domain) = tag.parse::<Domain>() {
        return Some(domain);
    }
    let tag = tag.trim().to_ascii_lowercase();
    KEYWORD_DOMAINS
        .iter()
        .find(|(keyword, _)| *keyword == tag)
        .map(|(_, domain)| *domain)
}

/// Derives the domain a task belongs to.
///
/// An explicit `domain` wins. Otherwise the category is consulted, then the
/// labels in order. Tasks that match nothing are personal.
pub fn derive_domain(task: &Task) -> Domain {
    if let Some(domain) = task.domain.as_deref().and_then(|d| d.parse().ok()) {
        return domain;
    }

    task.category
        .iter()
        .chain(task.labels.iter())
        .find_map(|tag| classify_tag(tag))
        .unwrap_or_default()
}
