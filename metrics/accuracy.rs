use crate::confusion_matrix::confusion_matrix;
use itertools::izip;
use num_traits::ToPrimitive;

/// The accuracy is the proportion of examples where predicted == truth.
pub fn accuracy(truth: &[usize], predictions: &[usize]) -> f64 {
	let n_correct = izip!(truth.iter(), predictions.iter())
		.filter(|(truth, prediction)| truth == prediction)
		.count();
	n_correct.to_f64().unwrap() / truth.len().to_f64().unwrap()
}

/// The balanced accuracy is the mean of the per-class recalls. Classes that never occur in the truth have no recall and are left out of the mean.
pub fn balanced_accuracy(truth: &[usize], predictions: &[usize], n_classes: usize) -> f64 {
	let matrix = confusion_matrix(truth, predictions, n_classes);
	let recalls: Vec<f64> = (0..n_classes)
		.filter_map(|class| {
			let row_total: u64 = matrix.row(class).sum();
			if row_total == 0 {
				None
			} else {
				let diagonal = matrix[[class, class]];
				Some(diagonal.to_f64().unwrap() / row_total.to_f64().unwrap())
			}
		})
		.collect();
	if recalls.is_empty() {
		return f64::NAN;
	}
	recalls.iter().sum::<f64>() / recalls.len().to_f64().unwrap()
}

#[test]
fn test_accuracy() {
	let truth = vec![0, 1, 0, 1];
	let predictions = vec![0, 1, 1, 1];
	assert!((accuracy(&truth, &predictions) - 0.75).abs() < f64::EPSILON);
	assert!((accuracy(&truth, &truth) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_balanced_accuracy() {
	// class 0 recall = 1.0, class 1 recall = 0.5
	let truth = vec![0, 0, 1, 1];
	let predictions = vec![0, 0, 1, 0];
	assert!((balanced_accuracy(&truth, &predictions, 2) - 0.75).abs() < f64::EPSILON);
}

#[test]
fn test_balanced_accuracy_absent_class() {
	// class 2 never occurs in the truth, so only classes 0 and 1 contribute
	let truth = vec![0, 1];
	let predictions = vec![0, 1];
	assert!((balanced_accuracy(&truth, &predictions, 3) - 1.0).abs() < f64::EPSILON);
}
