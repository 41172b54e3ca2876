/// This function computes the area under the receiver operating characteristic curve using the trapezoid method. `labels` holds the canonical-encoded binary labels, where `1` is the positive class.
pub fn auc_roc(probabilities: &[f64], labels: &[usize]) -> f64 {
	let roc_curve = roc_curve(probabilities, labels);
	// compute the riemann sum of the roc curve
	(0..roc_curve.len() - 1)
		.map(|i| {
			let left = &roc_curve[i];
			let right = &roc_curve[i + 1];
			let y_left = left.true_positive_rate;
			let y_right = right.true_positive_rate;
			let y_average = (y_left + y_right) / 2.0;
			let dx = right.false_positive_rate - left.false_positive_rate;
			y_average * dx
		})
		.sum()
}

#[derive(Debug, PartialEq)]
pub struct RocCurvePoint {
	/// The classification threshold.
	pub threshold: f64,
	/// The true positive rate for all predictions with probability >= threshold.
	pub true_positive_rate: f64,
	/// The false positive rate for all predictions with probability >= threshold.
	pub false_positive_rate: f64,
}

/// This function computes the ROC curve, which plots the false positive rate on the x axis and the true positive rate on the y axis for decreasing classification thresholds.
pub fn roc_curve(probabilities: &[f64], labels: &[usize]) -> Vec<RocCurvePoint> {
	let mut tps_fps = compute_tps_fps_by_threshold(probabilities, labels);
	for i in 1..tps_fps.len() {
		tps_fps[i].true_positives += tps_fps[i - 1].true_positives;
		tps_fps[i].false_positives += tps_fps[i - 1].false_positives;
	}
	let count_positives: usize = labels.iter().sum();
	let count_negatives = labels.len() - count_positives;
	// start the curve at (0,0) with a dummy threshold of 1.0
	let mut roc_curve = vec![RocCurvePoint {
		threshold: 1.0,
		true_positive_rate: 0.0,
		false_positive_rate: 0.0,
	}];
	for tps_fps_point in tps_fps.iter() {
		roc_curve.push(RocCurvePoint {
			threshold: tps_fps_point.threshold,
			true_positive_rate: tps_fps_point.true_positives as f64 / count_positives as f64,
			false_positive_rate: tps_fps_point.false_positives as f64 / count_negatives as f64,
		});
	}
	roc_curve
}

#[derive(Debug)]
struct TpsFpsPoint {
	/// The classification threshold.
	threshold: f64,
	/// The count of true positives at exactly this threshold.
	true_positives: usize,
	/// The count of false positives at exactly this threshold.
	false_positives: usize,
}

/// This function computes the counts of true positives and false positives at each distinct threshold, sorted by decreasing threshold. Examples with equal probability share one bucket.
fn compute_tps_fps_by_threshold(probabilities: &[f64], labels: &[usize]) -> Vec<TpsFpsPoint> {
	let mut probabilities_labels: Vec<(f64, usize)> = probabilities
		.iter()
		.zip(labels.iter())
		.map(|(probability, label)| (*probability, *label))
		.collect();
	probabilities_labels.sort_by(|a, b| b.0.total_cmp(&a.0));
	let mut tps_fps: Vec<TpsFpsPoint> = Vec::new();
	for (probability, label) in probabilities_labels {
		match tps_fps.last_mut() {
			Some(last_point) if probability == last_point.threshold => {
				last_point.true_positives += label;
				last_point.false_positives += 1 - label;
			}
			_ => {
				tps_fps.push(TpsFpsPoint {
					threshold: probability,
					true_positives: label,
					false_positives: 1 - label,
				});
			}
		}
	}
	tps_fps
}

#[test]
fn test_roc_curve() {
	let labels = vec![1, 1, 0, 0];
	let probabilities = vec![0.9, 0.4, 0.4, 0.2];
	let left = roc_curve(probabilities.as_slice(), labels.as_slice());
	let right = vec![
		RocCurvePoint {
			threshold: 1.0,
			true_positive_rate: 0.0,
			false_positive_rate: 0.0,
		},
		RocCurvePoint {
			threshold: 0.9,
			true_positive_rate: 0.5,
			false_positive_rate: 0.0,
		},
		RocCurvePoint {
			threshold: 0.4,
			true_positive_rate: 1.0,
			false_positive_rate: 0.5,
		},
		RocCurvePoint {
			threshold: 0.2,
			true_positive_rate: 1.0,
			false_positive_rate: 1.0,
		},
	];
	assert_eq!(left, right);
	let auc = auc_roc(probabilities.as_slice(), labels.as_slice());
	assert!(f64::abs(auc - 0.875) < f64::EPSILON);
}

#[test]
fn test_roc_curve_tolerates_non_finite_probability() {
	let labels = vec![1, 0];
	let probabilities = vec![f64::NAN, 0.4];
	let curve = roc_curve(probabilities.as_slice(), labels.as_slice());
	// the nan threshold gets its own bucket and nothing panics
	assert_eq!(curve.len(), 3);
}

#[test]
fn test_auc_roc_perfect_separation() {
	let labels = vec![0, 0, 1, 1];
	let probabilities = vec![0.1, 0.2, 0.8, 0.9];
	let auc = auc_roc(probabilities.as_slice(), labels.as_slice());
	assert!(f64::abs(auc - 1.0) < f64::EPSILON);
}
