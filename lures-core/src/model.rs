use serde::{Deserialize, Serialize};

/// A fishing spot with fixed coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lake {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Lake {
    pub fn new(name: &str, lat: f64, lon: f64) -> Self {
        Self {
            name: name.to_string(),
            lat,
            lon,
        }
    }
}

/// The fixed set of lakes the report covers. Immutable for the process
/// lifetime; callers clone entries into query tasks.
pub fn default_lakes() -> Vec<Lake> {
    vec![
        Lake::new("Lake Winnebago", 44.0130, -88.5374),
        Lake::new("Lake Mendota", 43.1312, -89.4125),
        Lake::new("Lake Monona", 43.0726, -89.3800),
    ]
}

/// Current conditions at one lake, as reported by the weather provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub air_temp_f: f64,
    pub condition: String,
}

/// One lake's derived fishing outlook: the observation plus the
/// water-temperature estimate and the lure that follows from it.
/// Recomputed on every refresh, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub lake_name: String,
    pub air_temp_f: f64,
    pub water_temp_f: f64,
    pub condition: String,
    pub lure: String,
}

/// The record handed to the rendering sink after a successful refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRecord {
    pub date: String,
    pub spot: String,
    pub temps: String,
    pub condition: String,
    pub lure: String,
}

impl DisplayRecord {
    /// Format a candidate for display, dated with the given local date.
    pub fn from_candidate(candidate: &Candidate, date: chrono::NaiveDate) -> Self {
        Self {
            date: date.format("%A, %B %-d, %Y").to_string(),
            spot: format!("Best Spot: {}", candidate.lake_name),
            temps: format!(
                "Air: {:.1}\u{b0}F | Water: {:.1}\u{b0}F",
                candidate.air_temp_f, candidate.water_temp_f
            ),
            condition: format!("Conditions: {}", candidate.condition),
            lure: format!("Use: {}", candidate.lure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn default_lakes_are_fixed_three() {
        let lakes = default_lakes();
        assert_eq!(lakes.len(), 3);
        assert_eq!(lakes[0].name, "Lake Winnebago");
        assert_eq!(lakes[1].name, "Lake Mendota");
        assert_eq!(lakes[2].name, "Lake Monona");
    }

    #[test]
    fn display_record_formats_one_decimal() {
        let candidate = Candidate {
            lake_name: "Lake Mendota".to_string(),
            air_temp_f: 72.0,
            water_temp_f: 67.0,
            condition: "Clear".to_string(),
            lure: "Crankbait or spinnerbait".to_string(),
        };
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date");
        let record = DisplayRecord::from_candidate(&candidate, date);

        assert_eq!(record.date, "Monday, June 2, 2025");
        assert_eq!(record.spot, "Best Spot: Lake Mendota");
        assert_eq!(record.temps, "Air: 72.0\u{b0}F | Water: 67.0\u{b0}F");
        assert_eq!(record.condition, "Conditions: Clear");
        assert_eq!(record.lure, "Use: Crankbait or spinnerbait");
    }
}
