//! Synthetic cohort used to fit the risk model.
//!
//! Three bands of 100 patients with low, medium and high physiological risk are
//! drawn from a generator seeded with a fixed constant, so every fit sees the
//! same rows. Medium-band labels are coin flips on purpose.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::domain::FEATURE_COUNT;

pub const TRAINING_SEED: u64 = 42;
pub const BAND_SIZE: usize = 100;

/// Mean and standard deviation of a normally distributed measurement.
#[derive(Debug, Clone, Copy)]
struct Normal {
    mean: f64,
    sd: f64,
}

const fn normal(mean: f64, sd: f64) -> Normal {
    Normal { mean, sd }
}

#[derive(Debug, Clone, Copy)]
enum BandLabel {
    Negative,
    CoinFlip(f64),
    Positive,
}

/// Generating distribution for one risk band.
#[derive(Debug, Clone, Copy)]
struct Band {
    age: Normal,
    bmi: Normal,
    systolic: Normal,
    diastolic: Normal,
    family_history_rate: f64,
    label: BandLabel,
}

const BANDS: [Band; 3] = [
    Band {
        age: normal(35.0, 10.0),
        bmi: normal(22.0, 2.0),
        systolic: normal(115.0, 10.0),
        diastolic: normal(75.0, 8.0),
        family_history_rate: 0.1,
        label: BandLabel::Negative,
    },
    Band {
        age: normal(50.0, 10.0),
        bmi: normal(27.0, 2.0),
        systolic: normal(130.0, 10.0),
        diastolic: normal(85.0, 8.0),
        family_history_rate: 0.4,
        label: BandLabel::CoinFlip(0.5),
    },
    Band {
        age: normal(60.0, 8.0),
        bmi: normal(32.0, 3.0),
        systolic: normal(145.0, 10.0),
        diastolic: normal(95.0, 8.0),
        family_history_rate: 0.7,
        label: BandLabel::Positive,
    },
];

/// Feature rows and 0/1 labels, row-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub rows: Vec<[f64; FEATURE_COUNT]>,
    pub labels: Vec<f64>,
}

impl TrainingSet {
    pub fn synthetic() -> Self {
        Self::synthetic_with_seed(TRAINING_SEED)
    }

    pub fn synthetic_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rows = Vec::with_capacity(BANDS.len() * BAND_SIZE);
        let mut labels = Vec::with_capacity(BANDS.len() * BAND_SIZE);

        for band in &BANDS {
            let (band_rows, band_labels) = sample_band(band, &mut rng);
            rows.extend(band_rows);
            labels.extend(band_labels);
        }

        Self { rows, labels }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// Columns are drawn one at a time across the whole band, labels last.
fn sample_band(band: &Band, rng: &mut StdRng) -> (Vec<[f64; FEATURE_COUNT]>, Vec<f64>) {
    let ages = sample_normal(band.age, rng);
    let bmis = sample_normal(band.bmi, rng);
    let systolic = sample_normal(band.systolic, rng);
    let diastolic = sample_normal(band.diastolic, rng);
    let family = sample_bernoulli(band.family_history_rate, rng);

    let rows = (0..BAND_SIZE)
        .map(|i| [ages[i], bmis[i], systolic[i], diastolic[i], family[i]])
        .collect();

    let labels = match band.label {
        BandLabel::Negative => vec![0.0; BAND_SIZE],
        BandLabel::Positive => vec![1.0; BAND_SIZE],
        BandLabel::CoinFlip(p) => sample_bernoulli(p, rng),
    };

    (rows, labels)
}

fn sample_normal(dist: Normal, rng: &mut StdRng) -> Vec<f64> {
    (0..BAND_SIZE)
        .map(|_| dist.mean + dist.sd * standard_normal(rng))
        .collect()
}

fn sample_bernoulli(p: f64, rng: &mut StdRng) -> Vec<f64> {
    (0..BAND_SIZE)
        .map(|_| if rng.gen_bool(p) { 1.0 } else { 0.0 })
        .collect()
}

/// Box-Muller draw. `u1` lies in (0, 1] so the logarithm stays finite.
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
