//! Descriptor resolution: turning raw catalog metadata into the identity
//! the availability probe searches with.
//!
//! An item resolves to a primary IMDb id when its guid carries one, and
//! falls back to a normalized title (+ year) otherwise. Items with
//! neither are classified `Skipped` here, before ever reaching the
//! concurrency limiter.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Descriptor, ItemMetadata, SkipReason, normalize_title};

/// IMDb title ids embedded in agent guids, e.g.
/// `"com.plexapp.agents.imdb://tt2149175?lang=en"`.
static IMDB_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tt\d{7}").expect("valid regex"));

/// Extract an IMDb title id from an agent guid.
pub fn extract_imdb_id(guid: &str) -> Option<String> {
    IMDB_ID.find(guid).map(|m| m.as_str().to_string())
}

/// Policy deciding whether an item's identity is too ambiguous to probe.
///
/// The default rule skips items whose guid uses a non-IMDb identifier
/// scheme (e.g. a TMDb agent) when no title fallback is usable. The exact
/// ambiguity rule is a heuristic: "not an IMDb guid" may misclassify
/// legitimately identified items, which is why the rule is pluggable
/// rather than hard-coded.
pub trait SkipPolicy: Send + Sync + Clone {
    /// Returns a skip reason when the metadata is considered ambiguous.
    fn ambiguous(&self, meta: &ItemMetadata) -> Option<SkipReason>;
}

/// Default policy: a guid that carries no IMDb id is ambiguous.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeignGuidPolicy;

impl SkipPolicy for ForeignGuidPolicy {
    fn ambiguous(&self, meta: &ItemMetadata) -> Option<SkipReason> {
        match &meta.guid {
            Some(guid) if extract_imdb_id(guid).is_none() => Some(SkipReason::ForeignGuid {
                guid: guid.clone(),
            }),
            _ => None,
        }
    }
}

/// Resolve catalog metadata into a probe-ready descriptor.
///
/// Precedence: IMDb id from the guid, then normalized title/year
/// fallback. Ambiguity (per `policy`) only skips the item when the
/// fallback is unusable too; with a usable title the fallback wins.
///
/// A title alone is a usable fallback even without a release year; the
/// probe widens its year filter to an open range for those. Deployments
/// that want title-and-year or nothing can supply a stricter
/// [`SkipPolicy`].
pub fn resolve<P: SkipPolicy>(
    meta: &ItemMetadata,
    policy: &P,
) -> Result<Descriptor, SkipReason> {
    let title = normalize_title(&meta.title);

    if let Some(guid) = &meta.guid {
        if let Some(imdb) = extract_imdb_id(guid) {
            return Ok(Descriptor {
                imdb: Some(imdb),
                title,
                year: meta.year,
            });
        }
    }

    if title.is_empty() {
        return Err(policy.ambiguous(meta).unwrap_or(SkipReason::NoIdentity));
    }

    if let Some(reason) = policy.ambiguous(meta) {
        tracing::debug!(%reason, title = %title, "Ambiguous identity, using title fallback");
    }

    Ok(Descriptor {
        imdb: None,
        title,
        year: meta.year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(guid: Option<&str>, title: &str, year: Option<u16>) -> ItemMetadata {
        ItemMetadata {
            guid: guid.map(str::to_string),
            title: title.to_string(),
            year,
        }
    }

    #[test]
    fn test_extract_imdb_id() {
        assert_eq!(
            extract_imdb_id("com.plexapp.agents.imdb://tt2149175?lang=en"),
            Some("tt2149175".to_string())
        );
        assert_eq!(extract_imdb_id("com.plexapp.agents.themoviedb://550"), None);
    }

    #[test]
    fn test_resolve_prefers_imdb_guid() {
        let meta = meta(
            Some("com.plexapp.agents.imdb://tt2149175?lang=en"),
            "The Americans (2013)",
            Some(2013),
        );
        let d = resolve(&meta, &ForeignGuidPolicy).unwrap();
        assert_eq!(d.imdb.as_deref(), Some("tt2149175"));
        assert_eq!(d.title, "The Americans");
        assert_eq!(d.year, Some(2013));
    }

    #[test]
    fn test_resolve_title_fallback_is_normalized() {
        let meta = meta(None, "The Americans (2013)", None);
        let d = resolve(&meta, &ForeignGuidPolicy).unwrap();
        assert_eq!(d.imdb, None);
        assert_eq!(d.title, "The Americans");
    }

    #[test]
    fn test_resolve_foreign_guid_with_usable_title_falls_back() {
        let meta = meta(
            Some("com.plexapp.agents.themoviedb://550"),
            "Fight Club",
            Some(1999),
        );
        let d = resolve(&meta, &ForeignGuidPolicy).unwrap();
        assert_eq!(d.imdb, None);
        assert_eq!(d.search_key(), "Fight Club");
    }

    #[test]
    fn test_resolve_foreign_guid_without_title_skips() {
        let meta = meta(Some("com.plexapp.agents.themoviedb://550"), "", None);
        let reason = resolve(&meta, &ForeignGuidPolicy).unwrap_err();
        assert!(matches!(reason, SkipReason::ForeignGuid { .. }));
    }

    #[test]
    fn test_resolve_no_identity_skips() {
        let meta = meta(None, "  ", None);
        let reason = resolve(&meta, &ForeignGuidPolicy).unwrap_err();
        assert_eq!(reason, SkipReason::NoIdentity);
    }
}
