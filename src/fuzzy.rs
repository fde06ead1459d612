//! Approximate string matching by edit distance

use crate::sites::{SiteList, SiteRecord};

/// Levenshtein distance between two strings, counted in characters
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// First alternative at minimal distance from `query`
pub fn closest_match<'a, I, S>(query: &str, alternatives: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    let mut best: Option<(usize, &'a str)> = None;
    for alt in alternatives {
        let alt: &'a str = AsRef::<str>::as_ref(alt);
        let distance = levenshtein(query, alt);
        // strict comparison keeps the earliest of equal candidates
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, alt));
        }
    }
    best.map(|(_, alt)| alt)
}

/// Site whose name is closest to `query`
pub fn closest_site<'a>(query: &str, sites: &'a SiteList) -> Option<&'a SiteRecord> {
    let name = closest_match(query, sites.names())?;
    sites.iter().find(|s| s.name() == Some(name))
}
