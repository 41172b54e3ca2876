use itertools::izip;
use num_traits::ToPrimitive;

/// The mean absolute error is the mean of `|truth - prediction|`.
pub fn mean_absolute_error(truth: &[f64], predictions: &[f64]) -> f64 {
	let total: f64 = izip!(truth.iter(), predictions.iter())
		.map(|(truth, prediction)| (truth - prediction).abs())
		.sum();
	total / truth.len().to_f64().unwrap()
}

/// The mean squared error is the mean of `(truth - prediction)^2`.
pub fn mean_squared_error(truth: &[f64], predictions: &[f64]) -> f64 {
	let total: f64 = izip!(truth.iter(), predictions.iter())
		.map(|(truth, prediction)| {
			let error = truth - prediction;
			error * error
		})
		.sum();
	total / truth.len().to_f64().unwrap()
}

/// The mean squared log error is the mean of `(ln(1 + truth) - ln(1 + prediction))^2`. Callers must ensure that truth and predictions are non-negative.
pub fn mean_squared_log_error(truth: &[f64], predictions: &[f64]) -> f64 {
	let total: f64 = izip!(truth.iter(), predictions.iter())
		.map(|(truth, prediction)| {
			let error = truth.ln_1p() - prediction.ln_1p();
			error * error
		})
		.sum();
	total / truth.len().to_f64().unwrap()
}

/// The R² score is `1 - ss_res / ss_tot`. When the truth is constant, `ss_tot` is zero and the score is not finite.
pub fn r2_score(truth: &[f64], predictions: &[f64]) -> f64 {
	let n = truth.len().to_f64().unwrap();
	let mean = truth.iter().sum::<f64>() / n;
	let ss_res: f64 = izip!(truth.iter(), predictions.iter())
		.map(|(truth, prediction)| {
			let error = truth - prediction;
			error * error
		})
		.sum();
	let ss_tot: f64 = truth
		.iter()
		.map(|truth| {
			let deviation = truth - mean;
			deviation * deviation
		})
		.sum();
	1.0 - ss_res / ss_tot
}
