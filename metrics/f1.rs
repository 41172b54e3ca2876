/// The F1 score is the harmonic mean of precision and recall for the positive class, which is class `1` in the canonical binary encoding. When there are no positive labels and no positive predictions, the score is defined as `0.0`.
pub fn f1(truth: &[usize], predictions: &[usize]) -> f64 {
	let mut true_positives = 0usize;
	let mut false_positives = 0usize;
	let mut false_negatives = 0usize;
	for (truth, prediction) in truth.iter().zip(predictions.iter()) {
		match (*truth, *prediction) {
			(1, 1) => true_positives += 1,
			(0, 1) => false_positives += 1,
			(1, 0) => false_negatives += 1,
			_ => {}
		}
	}
	let denominator = 2 * true_positives + false_positives + false_negatives;
	if denominator == 0 {
		return 0.0;
	}
	(2 * true_positives) as f64 / denominator as f64
}

#[test]
fn test_f1() {
	let truth = vec![0, 1, 1, 0, 1];
	let predictions = vec![0, 1, 0, 1, 1];
	// tp = 2, fp = 1, fn = 1
	assert!((f1(&truth, &predictions) - 2.0 / 3.0).abs() < f64::EPSILON);
}

#[test]
fn test_f1_perfect() {
	let truth = vec![0, 1, 0, 1];
	assert!((f1(&truth, &truth) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_f1_no_positives() {
	let truth = vec![0, 0];
	let predictions = vec![0, 0];
	assert_eq!(f1(&truth, &predictions), 0.0);
}
