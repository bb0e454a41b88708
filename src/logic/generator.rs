//! Synthetic Point Generator
//!
//! Fabricates the labeled 2-D point cloud behind the scatter plots and the
//! data explorer tables. Normal samples fall into two separated square bands,
//! adversarial samples are scattered over the whole plane.
//!
//! The random source is passed in by the caller. Production code hands in an
//! unseeded generator so every scan looks fresh; tests seed it.

use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::models::{DataPoint, PointKind};

/// Square bands the normal population is drawn from (same range on both axes)
pub const NORMAL_BANDS: [(f64, f64); 2] = [(25.0, 45.0), (55.0, 75.0)];

/// Share of `total` placed in each normal band, as a fraction (2/5)
const BAND_SHARE: (usize, usize) = (2, 5);

/// Adversarial count when the caller does not pick one
pub const RANDOM_ADVERSARIAL_RANGE: RangeInclusive<usize> = 5..=20;

/// Safety points lost per adversarial sample
pub const SAFETY_PENALTY_PER_THREAT: usize = 4;

const COMPACT_ADVERSARIAL_ROWS: usize = 5;
const COMPACT_NORMAL_ROWS: usize = 15;

const ID_LENGTH: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

const AIRLINES: &[&str] = &["Jet Airways", "IndiGo", "Air India", "SpiceJet", "Multiple carriers"];
const SOURCES: &[&str] = &["Delhi", "Kolkata", "Banglore", "Mumbai", "Chennai"];
const DESTINATIONS: &[&str] = &["Cochin", "Banglore", "Delhi", "New Delhi", "Hyderabad"];

/// How many adversarial samples to inject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdversarialShare {
    /// Random count in [`RANDOM_ADVERSARIAL_RANGE`]
    Random,
    Fixed(usize),
}

/// A generated batch
#[derive(Debug, Clone)]
pub struct PointCloud {
    pub points: Vec<DataPoint>,
    pub adversarial_count: usize,
}

/// Population breakdown of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    pub total: usize,
    pub normal_count: usize,
    pub adversarial_count: usize,
    pub normal_pct: f64,
    pub adversarial_pct: f64,
}

impl PointCloud {
    pub fn normal_count(&self) -> usize {
        self.points.len() - self.adversarial_count
    }

    pub fn safety_score(&self) -> u8 {
        safety_score(self.adversarial_count)
    }

    pub fn composition(&self) -> Composition {
        composition(&self.points)
    }

    pub fn into_points(self) -> Vec<DataPoint> {
        self.points
    }
}

/// `max(0, 100 - adversarial_count * 4)`
pub fn safety_score(adversarial_count: usize) -> u8 {
    let penalty = adversarial_count.saturating_mul(SAFETY_PENALTY_PER_THREAT);
    100usize.saturating_sub(penalty) as u8
}

pub fn composition(points: &[DataPoint]) -> Composition {
    let total = points.len();
    let adversarial_count = points.iter().filter(|p| p.is_adversarial()).count();
    let normal_count = total - adversarial_count;

    Composition {
        total,
        normal_count,
        adversarial_count,
        normal_pct: percent(normal_count, total),
        adversarial_pct: percent(adversarial_count, total),
    }
}

/// First few adversarial rows followed by the first normal rows
pub fn compact_view(points: &[DataPoint]) -> Vec<DataPoint> {
    let adversarial = points
        .iter()
        .filter(|p| p.is_adversarial())
        .take(COMPACT_ADVERSARIAL_ROWS);
    let normal = points
        .iter()
        .filter(|p| !p.is_adversarial())
        .take(COMPACT_NORMAL_ROWS);

    adversarial.chain(normal).cloned().collect()
}

/// Generate a labeled point cloud.
///
/// Each normal band receives `ceil(total * 0.4)` points; the adversarial
/// population is sized by `share`.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, total: usize, share: AdversarialShare) -> PointCloud {
    let (num, den) = BAND_SHARE;
    let per_band = (total * num).div_ceil(den);
    let adversarial_count = match share {
        AdversarialShare::Random => rng.gen_range(RANDOM_ADVERSARIAL_RANGE),
        AdversarialShare::Fixed(count) => count,
    };

    let mut points = Vec::with_capacity(per_band * NORMAL_BANDS.len() + adversarial_count);

    for &band in NORMAL_BANDS.iter() {
        for _ in 0..per_band {
            points.push(create_point(rng, PointKind::Normal, band, band));
        }
    }

    for _ in 0..adversarial_count {
        points.push(create_point(rng, PointKind::Adversarial, (0.0, 100.0), (0.0, 100.0)));
    }

    PointCloud { points, adversarial_count }
}

fn create_point<R: Rng + ?Sized>(
    rng: &mut R,
    kind: PointKind,
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> DataPoint {
    let airline = pick(rng, AIRLINES);
    let source = pick(rng, SOURCES);
    let destination = pick(rng, DESTINATIONS);

    DataPoint {
        id: random_id(rng),
        x: rng.gen_range(x_range.0..x_range.1),
        y: rng.gen_range(y_range.0..y_range.1),
        kind,
        airline: airline.to_string(),
        date_of_journey: format!("{}/05/2019", rng.gen_range(1..=28)),
        source: source.to_string(),
        destination: destination.to_string(),
        route: format!("{} → {}", city_code(source), city_code(destination)),
        dep_time: clock_time(rng),
        arrival_time: clock_time(rng),
        duration: format!("{}h {}m", rng.gen_range(1..=5), rng.gen_range(0..60)),
        stops: if rng.gen_bool(0.5) { "1 stop" } else { "non-stop" }.to_string(),
        additional_info: if rng.gen_bool(0.2) {
            "In-flight meal not included"
        } else {
            "No info"
        }
        .to_string(),
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, vocabulary: &'static [&'static str]) -> &'static str {
    vocabulary.choose(rng).copied().unwrap_or_default()
}

fn random_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

fn clock_time<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:02}:{:02}", rng.gen_range(0..24), rng.gen_range(0..60))
}

fn city_code(city: &str) -> String {
    city.chars().take(3).collect::<String>().to_uppercase()
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn in_band(value: f64, band: (f64, f64)) -> bool {
        value >= band.0 && value <= band.1
    }

    #[test]
    fn test_safety_score_formula() {
        for count in 5..=20 {
            let expected = 100i64 - count as i64 * 4;
            assert_eq!(safety_score(count) as i64, expected.max(0));
            assert!(safety_score(count) <= 100);
        }
        assert_eq!(safety_score(0), 100);
        assert_eq!(safety_score(25), 0);
        assert_eq!(safety_score(usize::MAX), 0);
    }

    #[test]
    fn test_fixed_adversarial_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in 5..=20 {
            let cloud = generate(&mut rng, 100, AdversarialShare::Fixed(count));
            let labeled = cloud.points.iter().filter(|p| p.is_adversarial()).count();
            assert_eq!(labeled, count);
            assert_eq!(cloud.adversarial_count, count);
            assert_eq!(cloud.safety_score(), safety_score(count));
        }
    }

    #[test]
    fn test_random_adversarial_count_in_range() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let cloud = generate(&mut rng, 50, AdversarialShare::Random);
            assert!(RANDOM_ADVERSARIAL_RANGE.contains(&cloud.adversarial_count));
            assert!(cloud.safety_score() <= 100);
        }
    }

    #[test]
    fn test_points_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let cloud = generate(&mut rng, 150, AdversarialShare::Fixed(15));

        for point in &cloud.points {
            assert!((0.0..=100.0).contains(&point.x), "x out of range: {}", point.x);
            assert!((0.0..=100.0).contains(&point.y), "y out of range: {}", point.y);

            if point.kind == PointKind::Normal {
                let inside = NORMAL_BANDS
                    .iter()
                    .any(|&band| in_band(point.x, band) && in_band(point.y, band));
                assert!(inside, "normal point outside bands: ({}, {})", point.x, point.y);
            }
        }
    }

    #[test]
    fn test_band_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        let cloud = generate(&mut rng, 150, AdversarialShare::Fixed(0));
        assert_eq!(cloud.normal_count(), 120);

        // 0.4 * 7 = 2.8 rounds up per band
        let cloud = generate(&mut rng, 7, AdversarialShare::Fixed(0));
        assert_eq!(cloud.normal_count(), 6);
    }

    #[test]
    fn test_metadata_shape() {
        let mut rng = StdRng::seed_from_u64(3);
        let cloud = generate(&mut rng, 20, AdversarialShare::Fixed(5));

        for point in &cloud.points {
            assert_eq!(point.id.len(), ID_LENGTH);
            assert!(point.id.bytes().all(|b| ID_ALPHABET.contains(&b)));
            assert!(AIRLINES.contains(&point.airline.as_str()));
            assert!(point.route.contains(" → "));
            assert_eq!(point.dep_time.len(), 5);
            assert!(point.date_of_journey.ends_with("/05/2019"));
        }
    }

    #[test]
    fn test_city_code() {
        assert_eq!(city_code("Banglore"), "BAN");
        assert_eq!(city_code("New Delhi"), "NEW");
    }

    #[test]
    fn test_composition_and_compact_view() {
        let mut rng = StdRng::seed_from_u64(9);
        let cloud = generate(&mut rng, 150, AdversarialShare::Fixed(15));
        let comp = cloud.composition();

        assert_eq!(comp.total, 135);
        assert_eq!(comp.normal_count, 120);
        assert_eq!(comp.adversarial_count, 15);
        assert_eq!(comp.normal_pct, 88.9);
        assert_eq!(comp.adversarial_pct, 11.1);

        let compact = compact_view(&cloud.points);
        assert_eq!(compact.len(), 20);
        assert!(compact[..5].iter().all(|p| p.is_adversarial()));
        assert!(compact[5..].iter().all(|p| !p.is_adversarial()));
    }

    #[test]
    fn test_empty_composition() {
        let comp = composition(&[]);
        assert_eq!(comp.total, 0);
        assert_eq!(comp.normal_pct, 0.0);
    }

    #[test]
    fn test_unseeded_batches_differ() {
        let a = generate(&mut rand::thread_rng(), 30, AdversarialShare::Fixed(5));
        let b = generate(&mut rand::thread_rng(), 30, AdversarialShare::Fixed(5));
        let ids_a: Vec<_> = a.points.iter().map(|p| p.id.clone()).collect();
        let ids_b: Vec<_> = b.points.iter().map(|p| p.id.clone()).collect();
        assert_ne!(ids_a, ids_b);
    }
}
