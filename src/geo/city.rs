const KNOWN_CITIES: &[&str] = &[
    "South San Francisco",
    "San Francisco",
    "Mountain View",
    "Redwood City",
    "Marin County",
    "Santa Clara",
    "Daly City",
    "Palo Alto",
    "San Mateo",
    "Sunnyvale",
    "San Jose",
    "Berkeley",
    "Oakland",
    "Fremont",
    "Hayward",
    "Austin",
];

const ALIASES: &[(&str, &str)] = &[
    ("sf", "San Francisco"),
    ("s.f.", "San Francisco"),
    ("san fran", "San Francisco"),
    ("sanfran", "San Francisco"),
    ("ssf", "South San Francisco"),
    ("south sf", "South San Francisco"),
    ("marin", "Marin County"),
    ("marin county", "Marin County"),
    ("sj", "San Jose"),
    ("atx", "Austin"),
];

/// Shortest alias allowed in the free-text pass; two-letter codes only
/// count as a whole comma segment.
const MIN_KEYWORD_ALIAS_LEN: usize = 5;

pub fn extract_city(address: &str) -> String {
    for segment in address.split(',') {
        let segment = segment.trim().to_lowercase();
        if segment.is_empty() {
            continue;
        }
        if let Some(city) = match_segment(&segment) {
            return city.to_string();
        }
    }

    keyword_search(&address.to_lowercase())
        .map(str::to_string)
        .unwrap_or_default()
}

fn match_segment(segment: &str) -> Option<&'static str> {
    if let Some((_, city)) = ALIASES.iter().find(|(alias, _)| *alias == segment) {
        return Some(city);
    }

    KNOWN_CITIES
        .iter()
        .find(|city| city.to_lowercase() == segment)
        .copied()
}

// Cities are listed longest-first so "south san francisco" wins over
// "san francisco".
fn keyword_search(haystack: &str) -> Option<&'static str> {
    if let Some(city) = KNOWN_CITIES
        .iter()
        .find(|city| haystack.contains(&city.to_lowercase()))
    {
        return Some(city);
    }

    ALIASES
        .iter()
        .filter(|(alias, _)| alias.len() >= MIN_KEYWORD_ALIAS_LEN)
        .find(|(alias, _)| haystack.contains(alias))
        .map(|(_, city)| *city)
}
