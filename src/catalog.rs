// Static demo catalog: three themed series, each with an ordered list of
// fallback search queries for the download executor to rotate through.

use crate::error::SeedError;
use crate::models::Series;

pub const SERIES: &[Series] = &[
    Series {
        slug: "urban-dreams",
        display_name: "Urban Dreams",
        queries: &[
            "city life",
            "urban street",
            "city night",
            "modern life",
            "walking city",
            "urban culture",
            "city view",
            "metropolitan",
            "downtown",
            "city lights",
            "urban lifestyle",
            "cityscape",
            "street scene",
            "urban architecture",
            "city traffic",
        ],
    },
    Series {
        slug: "love-and-coffee",
        display_name: "Love & Coffee",
        queries: &[
            "coffee shop",
            "cafe interior",
            "barista",
            "coffee cup",
            "latte art",
            "coffee making",
            "cafe culture",
            "morning coffee",
            "espresso",
            "coffee beans",
            "romantic cafe",
            "coffee date",
            "coffee brewing",
            "cappuccino",
            "coffee lifestyle",
        ],
    },
    Series {
        slug: "tech-life",
        display_name: "Tech Life",
        queries: &[
            "office work",
            "startup office",
            "coding",
            "computer work",
            "tech startup",
            "modern office",
            "meeting room",
            "coworking",
            "developer",
            "programming",
            "tech company",
            "office space",
            "business meeting",
            "laptop work",
            "tech workplace",
        ],
    },
];

/// Look up a series by slug. A miss is a configuration error, not a
/// recoverable condition.
pub fn find_series(slug: &str) -> Result<&'static Series, SeedError> {
    SERIES
        .iter()
        .find(|s| s.slug == slug)
        .ok_or_else(|| SeedError::UnknownSeries(slug.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_series_by_slug() {
        let series = find_series("tech-life").unwrap();
        assert_eq!(series.display_name, "Tech Life");
    }

    #[test]
    fn test_find_series_unknown_slug() {
        assert!(find_series("does-not-exist").is_err());
    }

    #[test]
    fn test_slugs_are_unique() {
        let mut slugs: Vec<&str> = SERIES.iter().map(|s| s.slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), SERIES.len());
    }

    #[test]
    fn test_every_series_has_queries() {
        for series in SERIES {
            assert!(
                !series.queries.is_empty(),
                "series '{}' has no queries",
                series.slug
            );
        }
    }
}
