//! Static lookup of trustworthy education organizations.
//!
//! Only consulted when the service does not suggest links of its own.

/// Keyword (lower-case) to canonical URL, scanned top to bottom.
///
/// When one keyword contains another, the longer one is listed first so the
/// more specific organization wins.
pub const CREDIBLE_SOURCES: &[(&str, &str)] = &[
    ("commission on higher education", "https://ched.gov.ph"),
    ("ched", "https://ched.gov.ph"),
    ("department of education", "https://www.deped.gov.ph"),
    ("deped", "https://www.deped.gov.ph"),
    ("tesda", "https://www.tesda.gov.ph"),
    ("polytechnic university of the philippines", "https://www.pup.edu.ph"),
    ("university of the philippines", "https://up.edu.ph"),
    ("ateneo de manila", "https://www.ateneo.edu"),
    ("de la salle", "https://www.dlsu.edu.ph"),
    ("university of santo tomas", "https://www.ust.edu.ph"),
];

/// Returns the URL of the first listed organization mentioned in `text`.
///
/// Matching is a case-insensitive substring test, so "ched" also matches
/// inside longer words.
pub fn match_source(text: &str) -> Option<&'static str> {
    let haystack = text.to_lowercase();
    CREDIBLE_SOURCES
        .iter()
        .find(|(keyword, _)| haystack.contains(keyword))
        .map(|(_, url)| *url)
}
