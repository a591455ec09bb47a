use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::dataset::TrainingSet;
use super::domain::{PatientFeatures, RiskAssessment, FEATURE_COUNT, FEATURE_NAMES};

pub const MODEL_VERSION: &str = "1.0";
pub const MAX_ITERATIONS: usize = 1000;

const CONVERGENCE_TOLERANCE: f64 = 1e-10;
/// Penalty on the coefficients (never the intercept), equivalent to C = 1.
const L2_PENALTY: f64 = 1.0;
const PARAMETER_COUNT: usize = FEATURE_COUNT + 1;

type Row = [f64; FEATURE_COUNT];

/// Per-feature standardization learned from the training rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    pub mean: Row,
    pub scale: Row,
}

impl Normalization {
    /// Population mean and standard deviation per column. A constant column keeps
    /// a unit scale so standardizing never divides by zero.
    pub fn fit(rows: &[Row]) -> Self {
        let count = rows.len().max(1) as f64;
        let mut mean = [0.0; FEATURE_COUNT];
        let mut scale = [0.0; FEATURE_COUNT];

        for column in 0..FEATURE_COUNT {
            let column_mean = rows.iter().map(|row| row[column]).sum::<f64>() / count;
            let variance = rows
                .iter()
                .map(|row| (row[column] - column_mean).powi(2))
                .sum::<f64>()
                / count;
            let sd = variance.sqrt();
            mean[column] = column_mean;
            scale[column] = if sd > 0.0 { sd } else { 1.0 };
        }

        Self { mean, scale }
    }

    pub fn apply(&self, row: &Row) -> Row {
        let mut standardized = [0.0; FEATURE_COUNT];
        for (column, value) in standardized.iter_mut().enumerate() {
            *value = (row[column] - self.mean[column]) / self.scale[column];
        }
        standardized
    }
}

/// Fitted logistic classifier plus the normalization it was trained under.
///
/// Replaced wholesale on retraining; nothing mutates a model once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub version: String,
    pub intercept: f64,
    pub coefficients: Row,
    pub normalization: Normalization,
    pub training_accuracy: f64,
    pub training_samples: usize,
    pub iterations: usize,
}

impl TrainedModel {
    pub fn fit(set: &TrainingSet) -> Self {
        let normalization = Normalization::fit(&set.rows);
        let standardized: Vec<Row> = set
            .rows
            .iter()
            .map(|row| normalization.apply(row))
            .collect();

        let fit = fit_logistic(&standardized, &set.labels);

        let mut model = Self {
            version: MODEL_VERSION.to_string(),
            intercept: fit.intercept,
            coefficients: fit.coefficients,
            normalization,
            training_accuracy: 0.0,
            training_samples: set.len(),
            iterations: fit.iterations,
        };
        model.training_accuracy = model.accuracy(&standardized, &set.labels);
        model
    }

    /// Probability of the positive class for raw, unscaled features.
    pub fn probability(&self, features: &PatientFeatures) -> f64 {
        let standardized = self.normalization.apply(&features.as_row());
        sigmoid(self.linear_score(&standardized))
    }

    pub fn assess(&self, features: &PatientFeatures) -> RiskAssessment {
        RiskAssessment::from_probability(self.probability(features), &self.version)
    }

    pub fn feature_importance(&self) -> BTreeMap<String, f64> {
        FEATURE_NAMES
            .iter()
            .zip(self.coefficients.iter())
            .map(|(name, coefficient)| (name.to_string(), *coefficient))
            .collect()
    }

    fn linear_score(&self, standardized: &Row) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(standardized.iter())
                .map(|(weight, value)| weight * value)
                .sum::<f64>()
    }

    fn accuracy(&self, standardized: &[Row], labels: &[f64]) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        let correct = standardized
            .iter()
            .zip(labels)
            .filter(|(row, label)| {
                let predicted = if sigmoid(self.linear_score(row)) >= 0.5 {
                    1.0
                } else {
                    0.0
                };
                predicted == **label
            })
            .count();
        correct as f64 / labels.len() as f64
    }
}

struct LogisticFit {
    intercept: f64,
    coefficients: Row,
    iterations: usize,
}

/// Newton iterations (IRLS) on the penalized log-loss. Parameter 0 is the
/// intercept.
fn fit_logistic(rows: &[Row], labels: &[f64]) -> LogisticFit {
    let mut beta = [0.0; PARAMETER_COUNT];
    let mut iterations = 0;

    for iteration in 1..=MAX_ITERATIONS {
        iterations = iteration;
        let mut gradient = [0.0; PARAMETER_COUNT];
        let mut hessian = [[0.0; PARAMETER_COUNT]; PARAMETER_COUNT];

        for (row, label) in rows.iter().zip(labels) {
            let design = design_row(row);
            let z: f64 = beta.iter().zip(design.iter()).map(|(b, x)| b * x).sum();
            let p = sigmoid(z);
            let weight = p * (1.0 - p);
            for i in 0..PARAMETER_COUNT {
                gradient[i] += (p - label) * design[i];
                for j in 0..PARAMETER_COUNT {
                    hessian[i][j] += weight * design[i] * design[j];
                }
            }
        }

        for i in 1..PARAMETER_COUNT {
            gradient[i] += L2_PENALTY * beta[i];
            hessian[i][i] += L2_PENALTY;
        }

        let Some(step) = solve(hessian, gradient) else {
            tracing::warn!(iteration, "newton system became singular; keeping last estimate");
            break;
        };

        for (b, delta) in beta.iter_mut().zip(step.iter()) {
            *b -= delta;
        }

        if step.iter().all(|delta| delta.abs() < CONVERGENCE_TOLERANCE) {
            break;
        }
    }

    let mut coefficients = [0.0; FEATURE_COUNT];
    coefficients.copy_from_slice(&beta[1..]);

    LogisticFit {
        intercept: beta[0],
        coefficients,
        iterations,
    }
}

fn design_row(row: &Row) -> [f64; PARAMETER_COUNT] {
    let mut design = [1.0; PARAMETER_COUNT];
    design[1..].copy_from_slice(row);
    design
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(
    mut matrix: [[f64; PARAMETER_COUNT]; PARAMETER_COUNT],
    mut rhs: [f64; PARAMETER_COUNT],
) -> Option<[f64; PARAMETER_COUNT]> {
    for col in 0..PARAMETER_COUNT {
        let pivot = (col..PARAMETER_COUNT).max_by(|a, b| {
            matrix[*a][col]
                .abs()
                .total_cmp(&matrix[*b][col].abs())
        })?;
        if matrix[pivot][col].abs() < f64::EPSILON {
            return None;
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in col + 1..PARAMETER_COUNT {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..PARAMETER_COUNT {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = [0.0; PARAMETER_COUNT];
    for row in (0..PARAMETER_COUNT).rev() {
        let tail: f64 = (row + 1..PARAMETER_COUNT)
            .map(|k| matrix[row][k] * solution[k])
            .sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }
    Some(solution)
}
