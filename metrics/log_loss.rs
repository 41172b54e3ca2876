use ndarray::prelude::*;
use num_traits::{clamp, ToPrimitive};

const EPSILON: f64 = 1e-15;

/// The log loss is the mean negative log likelihood of the truth under the predicted distribution. Probabilities are clamped away from 0 and 1 and each row is renormalized before taking the log.
pub fn log_loss(probabilities: ArrayView2<f64>, truth: &[usize]) -> f64 {
	let mut total = 0.0;
	for (row, &label) in probabilities.genrows().into_iter().zip(truth.iter()) {
		let row_sum: f64 = row
			.iter()
			.map(|probability| clamp(*probability, EPSILON, 1.0 - EPSILON))
			.sum();
		let probability = clamp(row[label], EPSILON, 1.0 - EPSILON) / row_sum;
		total += -probability.ln();
	}
	total / truth.len().to_f64().unwrap()
}

#[test]
fn test_log_loss() {
	let probabilities = ndarray::arr2(&[[0.9, 0.1], [0.2, 0.8]]);
	let truth = vec![0, 1];
	let expected = -((0.9f64).ln() + (0.8f64).ln()) / 2.0;
	assert!((log_loss(probabilities.view(), &truth) - expected).abs() < 1e-12);
}

#[test]
fn test_log_loss_certain_wrong_prediction_is_finite() {
	let probabilities = ndarray::arr2(&[[1.0, 0.0]]);
	let truth = vec![1];
	let loss = log_loss(probabilities.view(), &truth);
	assert!(loss.is_finite());
	assert!(loss > 30.0);
}
