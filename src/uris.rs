use url::Url;

use crate::errors::{PlaceMatchError, Result};

/// Returns the network-location (host) component of a URI, if it has one.
pub fn netloc(uri: &str) -> Option<String> {
    Url::parse(uri)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
}

/// Returns the last non-empty path segment of a URI.
///
/// Gazetteer place URIs carry the pid as their trailing segment.
pub fn trailing_segment(uri: &str) -> Option<String> {
    uri.split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(str::to_owned)
}

/// Returns true if the URI can be parsed as an absolute URL.
pub fn is_valid_url(uri: &str) -> bool {
    Url::parse(uri).is_ok()
}

/// Compact link-identifier namespaces accepted in candidate datasets.
///
/// Each upstream source gets an explicit entry here; an unknown prefix is a
/// fatal error so that new sources force a mapping decision instead of
/// silently dropping data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkNamespace {
    Pleiades,
    Wikidata,
    Viaf,
    Wikipedia,
    Geonames,
    GettyTgn,
    LibraryOfCongress,
    Gnd,
    Bnf,
}

impl LinkNamespace {
    /// Maps a compact-identifier prefix to its namespace.
    pub fn from_prefix(prefix: &str) -> Option<LinkNamespace> {
        match prefix {
            "pl" => Some(LinkNamespace::Pleiades),
            "wd" => Some(LinkNamespace::Wikidata),
            "viaf" => Some(LinkNamespace::Viaf),
            "wp" => Some(LinkNamespace::Wikipedia),
            "gn" => Some(LinkNamespace::Geonames),
            "tgn" => Some(LinkNamespace::GettyTgn),
            "loc" => Some(LinkNamespace::LibraryOfCongress),
            "gnd" => Some(LinkNamespace::Gnd),
            "bnf" => Some(LinkNamespace::Bnf),
            _ => None,
        }
    }

    /// Expands an identifier in this namespace to an absolute URI.
    ///
    /// Returns `None` for namespaces whose links are ignored for now.
    pub fn expand(&self, identifier: &str) -> Option<String> {
        match self {
            LinkNamespace::Pleiades => {
                Some(format!("https://pleiades.stoa.org/places/{identifier}"))
            }
            LinkNamespace::Wikidata => {
                Some(format!("https://www.wikidata.org/wiki/{identifier}"))
            }
            LinkNamespace::Viaf => Some(format!("https://viaf.org/viaf/{identifier}")),
            LinkNamespace::Wikipedia => Some(format!(
                "https://en.wikipedia.org/wiki/{}",
                identifier.replace(' ', "_")
            )),
            LinkNamespace::Geonames => Some(format!("https://www.geonames.org/{identifier}")),
            LinkNamespace::GettyTgn => Some(format!("http://vocab.getty.edu/tgn/{identifier}")),
            LinkNamespace::LibraryOfCongress | LinkNamespace::Gnd | LinkNamespace::Bnf => None,
        }
    }
}

/// Expands a candidate link identifier to an absolute URI.
///
/// Identifiers that already start with `http` pass through unchanged.
/// Compact identifiers are split on the first `:` and expanded through the
/// namespace registry; `Ok(None)` means the namespace is recognized but its
/// links are deliberately ignored.
pub fn expand_compact(identifier: &str) -> Result<Option<String>> {
    if identifier.starts_with("http") {
        return Ok(Some(identifier.to_string()));
    }
    let Some((prefix, rest)) = identifier.split_once(':') else {
        return Err(PlaceMatchError::LinkNamespace {
            namespace: identifier.to_string(),
            identifier: identifier.to_string(),
        });
    };
    match LinkNamespace::from_prefix(prefix) {
        Some(namespace) => Ok(namespace.expand(rest)),
        None => Err(PlaceMatchError::LinkNamespace {
            namespace: prefix.to_string(),
            identifier: identifier.to_string(),
        }),
    }
}
