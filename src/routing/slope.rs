use serde::Serialize;

use crate::routing::geometry::{LatLng, haversine_m};

pub const MIN_ELEVATION_SAMPLES: usize = 50;
pub const MAX_ELEVATION_SAMPLES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationSample {
    pub location: Option<LatLng>,
    pub elevation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlopeBucket {
    Low,
    Medium,
    High,
}

impl SlopeBucket {
    pub fn from_grade(max_grade_percent: f64) -> Self {
        if max_grade_percent < 4.0 {
            SlopeBucket::Low
        } else if max_grade_percent < 8.0 {
            SlopeBucket::Medium
        } else {
            SlopeBucket::High
        }
    }

    pub fn highlight(self) -> &'static str {
        match self {
            SlopeBucket::Low => "Gentle grade, good for an easy run.",
            SlopeBucket::Medium => "Includes some hills for a little challenge.",
            SlopeBucket::High => "Steeper sections - pace yourself.",
        }
    }
}

pub fn elevation_sample_count(path_len: usize) -> usize {
    path_len.clamp(MIN_ELEVATION_SAMPLES, MAX_ELEVATION_SAMPLES)
}

/// Largest absolute grade (percent) between consecutive samples.
///
/// Pairs with a missing location or zero horizontal distance are skipped.
/// Fewer than two samples means the slope is unknown.
pub fn max_grade_percent(samples: &[ElevationSample]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }

    let mut max_grade = 0.0_f64;
    for pair in samples.windows(2) {
        let (Some(a), Some(b)) = (pair[0].location, pair[1].location) else {
            continue;
        };
        let run = haversine_m(a, b);
        if run.is_nan() || run <= 0.0 {
            continue;
        }
        let grade = ((pair[1].elevation - pair[0].elevation) / run * 100.0).abs();
        if grade.is_finite() {
            max_grade = max_grade.max(grade);
        }
    }
    Some(max_grade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::geometry::destination_point;

    fn sample(at: LatLng, elevation: f64) -> ElevationSample {
        ElevationSample {
            location: Some(at),
            elevation,
        }
    }

    #[test]
    fn grade_is_absolute_and_maximal() {
        let a = LatLng::new(37.77, -122.42);
        let b = destination_point(a, 100.0, 90.0);
        let c = destination_point(b, 100.0, 90.0);
        let samples = vec![sample(a, 10.0), sample(b, 13.0), sample(c, 5.0)];
        let g = max_grade_percent(&samples).unwrap();
        assert!((g - 8.0).abs() < 0.01, "got {g}");
        assert_eq!(SlopeBucket::from_grade(g), SlopeBucket::High);
    }

    #[test]
    fn pairs_missing_location_are_skipped() {
        let a = LatLng::new(37.77, -122.42);
        let b = destination_point(a, 100.0, 0.0);
        let samples = vec![
            sample(a, 0.0),
            ElevationSample {
                location: None,
                elevation: 500.0,
            },
            sample(b, 2.0),
        ];
        assert_eq!(max_grade_percent(&samples), Some(0.0));
    }

    #[test]
    fn too_few_samples_is_unknown() {
        assert_eq!(max_grade_percent(&[]), None);
        assert_eq!(max_grade_percent(&[sample(LatLng::new(0.0, 0.0), 1.0)]), None);
    }

    #[test]
    fn buckets_and_sample_counts() {
        assert_eq!(SlopeBucket::from_grade(3.99), SlopeBucket::Low);
        assert_eq!(SlopeBucket::from_grade(4.0), SlopeBucket::Medium);
        assert_eq!(SlopeBucket::from_grade(8.0), SlopeBucket::High);
        assert_eq!(elevation_sample_count(3), 50);
        assert_eq!(elevation_sample_count(120), 120);
        assert_eq!(elevation_sample_count(5_000), 200);
    }
}
