//! Per-study sample datasets served by the simulated external service.

use std::collections::HashMap;

/// Studies with fixed region data; everything else gets a random value.
pub fn study_data() -> HashMap<&'static str, HashMap<&'static str, f64>> {
    HashMap::from([
        (
            "uk-sync",
            HashMap::from([
                ("US", 21.4),
                ("GB", 14.8),
                ("DE", 17.2),
                ("FR", 18.9),
                ("UA", 12.6),
            ]),
        ),
        (
            "uk-async",
            HashMap::from([
                ("US", 21.4),
                ("GB", 14.8),
                ("DE", 17.2),
                ("FR", 18.9),
                ("UA", 12.6),
            ]),
        ),
        (
            "world-gdp",
            HashMap::from([("US", 62.8), ("DE", 47.6), ("GB", 42.3), ("UA", 3.1)]),
        ),
        (
            "world-pop",
            HashMap::from([("US", 327.2), ("DE", 83.0), ("GB", 66.5), ("UA", 44.6)]),
        ),
        (
            "usa-districts-jdbc",
            HashMap::from([("CA", 39.5), ("TX", 28.7), ("NY", 19.5), ("FL", 21.3)]),
        ),
    ])
}
