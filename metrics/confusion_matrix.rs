use ndarray::prelude::*;
use num_traits::ToPrimitive;

/// Compute the confusion matrix over the canonical label set. Rows index the truth, columns index the predictions.
pub fn confusion_matrix(truth: &[usize], predictions: &[usize], n_classes: usize) -> Array2<u64> {
	let mut matrix = Array::zeros((n_classes, n_classes));
	for (truth, prediction) in truth.iter().zip(predictions.iter()) {
		matrix[[*truth, *prediction]] += 1;
	}
	matrix
}

/// The per-class error rate is `(row_total - diagonal) / row_total` for each row of the confusion matrix. A class that never occurs in the truth has a zero row total and yields `None`.
pub fn per_class_error_rates(matrix: ArrayView2<u64>) -> Vec<Option<f64>> {
	(0..matrix.nrows())
		.map(|class| {
			let row_total: u64 = matrix.row(class).sum();
			if row_total == 0 {
				None
			} else {
				let diagonal = matrix[[class, class]];
				Some((row_total - diagonal).to_f64().unwrap() / row_total.to_f64().unwrap())
			}
		})
		.collect()
}

#[test]
fn test_confusion_matrix() {
	let truth = vec![0, 1, 2, 1, 0];
	let predictions = vec![0, 2, 2, 1, 0];
	let matrix = confusion_matrix(&truth, &predictions, 3);
	let expected = ndarray::arr2(&[[2u64, 0, 0], [0, 1, 1], [0, 0, 1]]);
	assert_eq!(matrix, expected);
}

#[test]
fn test_confusion_matrix_perfect_predictions_is_diagonal() {
	let truth = vec![0, 1, 2, 1, 0, 2];
	let matrix = confusion_matrix(&truth, &truth, 3);
	for i in 0..3 {
		for j in 0..3 {
			if i != j {
				assert_eq!(matrix[[i, j]], 0);
			}
		}
	}
	assert_eq!(matrix[[0, 0]], 2);
	assert_eq!(matrix[[1, 1]], 2);
	assert_eq!(matrix[[2, 2]], 2);
}

#[test]
fn test_per_class_error_rates() {
	let truth = vec![0, 0, 0, 0, 1, 1];
	let predictions = vec![0, 0, 0, 1, 1, 0];
	let matrix = confusion_matrix(&truth, &predictions, 3);
	let errors = per_class_error_rates(matrix.view());
	assert_eq!(errors.len(), 3);
	assert!((errors[0].unwrap() - 0.25).abs() < f64::EPSILON);
	assert!((errors[1].unwrap() - 0.5).abs() < f64::EPSILON);
	// class 2 never occurs in the truth
	assert!(errors[2].is_none());
}
