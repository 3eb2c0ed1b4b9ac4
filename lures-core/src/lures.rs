//! Lure recommendation table.
//!
//! An ordered list of half-open water-temperature ranges; the first rule
//! where `min_f <= water < max_f` wins. The ranges are contiguous and
//! non-overlapping by construction, and anything outside them falls back
//! to [`FALLBACK_LURE`], so the lookup is total over all temperatures.

/// One row of the recommendation table. `min_f` is inclusive, `max_f`
/// exclusive.
#[derive(Debug, Clone, Copy)]
pub struct LureRule {
    pub min_f: f64,
    pub max_f: f64,
    pub lure: &'static str,
}

/// Recommendation for water temperatures outside every table range.
pub const FALLBACK_LURE: &str = "Plastic worm rig";

/// The fixed recommendation table, ordered coldest to warmest.
pub const LURE_RULES: &[LureRule] = &[
    LureRule { min_f: 0.0, max_f: 55.0, lure: "Slow jig or fat worm" },
    LureRule { min_f: 55.0, max_f: 65.0, lure: "Carolina rig or dropshot" },
    LureRule { min_f: 65.0, max_f: 75.0, lure: "Crankbait or spinnerbait" },
    LureRule { min_f: 75.0, max_f: 90.0, lure: "Topwater popper" },
];

/// Pick the lure for an estimated water temperature.
pub fn pick_lure(water_temp_f: f64) -> &'static str {
    for rule in LURE_RULES {
        if water_temp_f >= rule.min_f && water_temp_f < rule.max_f {
            return rule.lure;
        }
    }
    FALLBACK_LURE
}
