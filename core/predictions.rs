/*!
This module validates and writes predictions artifacts. A predictions artifact is a csv file whose last two columns are named exactly `predictions` and `truth`, preceded for classification by one probability column per class label, sorted lexicographically.
*/

use crate::results::ENCODE_PREDICTIONS_AND_TRUTH;
use anyhow::{bail, Result};
use benchscore_table::{parse_number, Column, Table};
use benchscore_util::backup::backup_file;
use benchscore_util::label_encoder::LabelEncoder;
use ndarray::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;

/// Strict checks applied to a loaded predictions table under verification mode, beyond what construction requires.
pub fn validate_predictions(table: &Table) -> Result<()> {
	let names = table.column_names();
	if names.len() < 2 {
		bail!("predictions frame should have 2 columns (regression) or more (classification)");
	}
	if names[names.len() - 1] != "truth" {
		bail!("last column of predictions frame must be named `truth`");
	}
	if names[names.len() - 2] != "predictions" {
		bail!("column before `truth` must be named `predictions`");
	}
	if names.len() == 2 {
		for column in table.columns.iter() {
			for cell in column.data.iter() {
				parse_number(cell)?;
			}
		}
		return Ok(());
	}
	let predictors = &names[..names.len() - 2];
	let mut sorted = predictors.to_vec();
	sorted.sort_unstable();
	if predictors != &sorted[..] {
		bail!("predictor columns are not sorted in lexicographic order");
	}
	let unique: BTreeSet<&str> = predictors.iter().copied().collect();
	if unique.len() != predictors.len() {
		bail!("predictions contain multiple columns with the same label");
	}
	for column in table.columns[..names.len() - 2].iter() {
		for cell in column.data.iter() {
			parse_number(cell)?;
		}
	}
	let predictions_column = &table.columns[names.len() - 2].data;
	let truth_column = &table.columns[names.len() - 1].data;
	if ENCODE_PREDICTIONS_AND_TRUTH {
		if truth_column.iter().any(|v| v.parse::<usize>().is_err()) {
			bail!("values in truth column are not encoded");
		}
		if predictions_column.iter().any(|v| v.parse::<usize>().is_err()) {
			bail!("values in predictions column are not encoded");
		}
	}
	// the label space truth and predictions live in: raw labels, or ordinals under the encoded policy
	let predictors_set: BTreeSet<String> = if ENCODE_PREDICTIONS_AND_TRUTH {
		(0..predictors.len()).map(|i| i.to_string()).collect()
	} else {
		predictors.iter().map(|name| (*name).to_owned()).collect()
	};
	let truth_set: BTreeSet<String> = truth_column.iter().cloned().collect();
	if predictors_set.is_subset(&truth_set) && predictors_set != truth_set {
		log::warn!(
			"Truth column contains values unseen during training: no matching probability column."
		);
	}
	if truth_set.is_subset(&predictors_set) && predictors_set != truth_set {
		log::warn!(
			"Truth column doesn't contain all the possible target values: the test dataset may be too small."
		);
	}
	let predictions_set: BTreeSet<String> = predictions_column.iter().cloned().collect();
	if !predictions_set.is_subset(&predictors_set) {
		let unexpected: Vec<&String> = predictions_set.difference(&predictors_set).collect();
		bail!(
			"predictions column contains unexpected values: {:?}",
			unexpected
		);
	}
	validate_argmax_consistency(table)?;
	Ok(())
}

/// Every predicted label must equal the probability column with the highest probability in its row, ties going to the first maximal column in label order.
fn validate_argmax_consistency(table: &Table) -> Result<()> {
	let n_predictors = table.ncols() - 2;
	let predictions_column = &table.columns[n_predictors].data;
	for row_index in 0..table.nrows() {
		let mut best_index = 0;
		let mut best_probability = f64::NEG_INFINITY;
		for column_index in 0..n_predictors {
			let probability = parse_number(&table.columns[column_index].data[row_index])?;
			if probability > best_probability {
				best_probability = probability;
				best_index = column_index;
			}
		}
		let expected = if ENCODE_PREDICTIONS_AND_TRUTH {
			best_index.to_string()
		} else {
			table.columns[best_index].name.clone()
		};
		if predictions_column[row_index] != expected {
			bail!(
				"predictions don't always match the predictor with the highest probability (row {})",
				row_index
			);
		}
	}
	Ok(())
}

pub struct SavePredictionsOptions<'a> {
	pub predictions: &'a [String],
	pub truth: &'a [String],
	/// One column per class label, row-aligned with predictions and truth.
	pub probabilities: Option<ArrayView2<'a, f64>>,
	/// The labels naming the probability columns, in the matrix's column order. Defaults to the encoder's classes.
	pub probabilities_labels: Option<&'a [String]>,
	pub target_encoder: Option<&'a LabelEncoder>,
	/// Whether predictions and truth are already in encoded ordinal form.
	pub target_is_encoded: bool,
}

/// Write a predictions artifact. Probability columns are reordered lexicographically when the supplied label order is not already sorted, remapping encoded predictions and truth to match; predictions and truth are then decoded or encoded according to the build-time policy. Any existing file is backed up first.
pub fn save_predictions(output_file: &Path, options: SavePredictionsOptions) -> Result<()> {
	log::debug!("Saving predictions to `{}`.", output_file.display());
	let mut columns: Vec<Column> = Vec::new();
	let mut remap: Option<Vec<usize>> = None;
	if let Some(probabilities) = options.probabilities {
		let labels: Vec<String> = match options.probabilities_labels {
			Some(labels) => labels.to_vec(),
			None => match options.target_encoder {
				Some(encoder) => encoder.classes().to_vec(),
				None => bail!("probability labels or a label encoder are required"),
			},
		};
		if labels.len() != probabilities.ncols() {
			bail!(
				"{} probability labels for {} probability columns",
				labels.len(),
				probabilities.ncols()
			);
		}
		let mut order: Vec<usize> = (0..labels.len()).collect();
		order.sort_by(|a, b| labels[*a].cmp(&labels[*b]));
		let reordered = order.iter().enumerate().any(|(new, old)| new != *old);
		if reordered && options.probabilities_labels.is_some() {
			// old ordinal -> new ordinal, to keep encoded predictions/truth aligned with the sorted columns
			let mut mapping = vec![0; order.len()];
			for (new, old) in order.iter().enumerate() {
				mapping[*old] = new;
			}
			remap = Some(mapping);
		}
		for &old in order.iter() {
			let data = probabilities
				.column(old)
				.iter()
				.map(|probability| probability.to_string())
				.collect();
			columns.push(Column {
				name: labels[old].clone(),
				data,
			});
		}
	}
	let predictions = transform_target(
		options.predictions,
		remap.as_deref(),
		options.target_encoder,
		options.target_is_encoded,
	)?;
	let truth = transform_target(
		options.truth,
		remap.as_deref(),
		options.target_encoder,
		options.target_is_encoded,
	)?;
	columns.push(Column {
		name: "predictions".to_owned(),
		data: predictions,
	});
	columns.push(Column {
		name: "truth".to_owned(),
		data: truth,
	});
	let table = Table { columns };
	backup_file(output_file)?;
	table.to_path(output_file)?;
	log::info!("Predictions saved to `{}`.", output_file.display());
	Ok(())
}

fn transform_target(
	values: &[String],
	remap: Option<&[usize]>,
	encoder: Option<&LabelEncoder>,
	target_is_encoded: bool,
) -> Result<Vec<String>> {
	if !ENCODE_PREDICTIONS_AND_TRUTH && target_is_encoded {
		let encoder = match encoder {
			Some(encoder) => encoder,
			None => bail!("a label encoder is required to decode predictions"),
		};
		values
			.iter()
			.map(|value| -> Result<String> {
				let mut ordinal: usize = value.parse()?;
				if let Some(remap) = remap {
					ordinal = remap[ordinal];
				}
				Ok(encoder.inverse_transform(ordinal)?.to_owned())
			})
			.collect()
	} else if ENCODE_PREDICTIONS_AND_TRUTH && !target_is_encoded {
		let encoder = match encoder {
			Some(encoder) => encoder,
			None => bail!("a label encoder is required to encode predictions"),
		};
		values
			.iter()
			.map(|value| -> Result<String> { Ok(encoder.transform(value)?.to_string()) })
			.collect()
	} else {
		Ok(values.to_vec())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn classification_table() -> Table {
		let mut table = Table::new(vec![
			"neg".to_owned(),
			"pos".to_owned(),
			"predictions".to_owned(),
			"truth".to_owned(),
		]);
		table.push_row(vec![
			"0.9".to_owned(),
			"0.1".to_owned(),
			"neg".to_owned(),
			"neg".to_owned(),
		]);
		table.push_row(vec![
			"0.2".to_owned(),
			"0.8".to_owned(),
			"pos".to_owned(),
			"pos".to_owned(),
		]);
		table
	}

	#[test]
	fn test_validate_ok() {
		validate_predictions(&classification_table()).unwrap();
	}

	#[test]
	fn test_validate_rejects_wrong_column_names() {
		let mut table = classification_table();
		table.columns[3].name = "actual".to_owned();
		assert!(validate_predictions(&table).is_err());
	}

	#[test]
	fn test_validate_rejects_unsorted_predictors() {
		let mut table = classification_table();
		table.columns.swap(0, 1);
		assert!(validate_predictions(&table).is_err());
	}

	#[test]
	fn test_validate_rejects_non_numeric_probability() {
		let mut table = classification_table();
		table.columns[0].data[0] = "high".to_owned();
		assert!(validate_predictions(&table).is_err());
	}

	#[test]
	fn test_validate_rejects_unexpected_prediction() {
		let mut table = classification_table();
		table.columns[2].data[0] = "maybe".to_owned();
		assert!(validate_predictions(&table).is_err());
	}

	#[test]
	fn test_validate_rejects_argmax_mismatch() {
		let mut table = classification_table();
		table.columns[2].data[0] = "pos".to_owned();
		table.columns[3].data[0] = "pos".to_owned();
		assert!(validate_predictions(&table).is_err());
	}

	#[test]
	fn test_validate_regression_rejects_non_numeric() {
		let mut table = Table::new(vec!["predictions".to_owned(), "truth".to_owned()]);
		table.push_row(vec!["1.5".to_owned(), "oops".to_owned()]);
		assert!(validate_predictions(&table).is_err());
	}

	#[test]
	fn test_save_predictions_sorts_probability_columns() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("predictions.csv");
		let probabilities = ndarray::arr2(&[[0.1, 0.9], [0.8, 0.2]]);
		let labels = vec!["pos".to_owned(), "neg".to_owned()];
		let predictions = vec!["neg".to_owned(), "pos".to_owned()];
		let truth = vec!["neg".to_owned(), "pos".to_owned()];
		save_predictions(
			&path,
			SavePredictionsOptions {
				predictions: &predictions,
				truth: &truth,
				probabilities: Some(probabilities.view()),
				probabilities_labels: Some(&labels),
				target_encoder: None,
				target_is_encoded: false,
			},
		)
		.unwrap();
		let table = Table::from_path(&path).unwrap();
		assert_eq!(
			table.column_names(),
			vec!["neg", "pos", "predictions", "truth"]
		);
		assert_eq!(table.column("neg").unwrap().data, vec!["0.9", "0.2"]);
		assert_eq!(table.column("pos").unwrap().data, vec!["0.1", "0.8"]);
		validate_predictions(&table).unwrap();
	}

	#[test]
	fn test_save_predictions_decodes_encoded_target() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("predictions.csv");
		let encoder =
			LabelEncoder::from_classes(vec!["neg".to_owned(), "pos".to_owned()]);
		let probabilities = ndarray::arr2(&[[0.9, 0.1], [0.2, 0.8]]);
		let predictions = vec!["0".to_owned(), "1".to_owned()];
		let truth = vec!["0".to_owned(), "1".to_owned()];
		save_predictions(
			&path,
			SavePredictionsOptions {
				predictions: &predictions,
				truth: &truth,
				probabilities: Some(probabilities.view()),
				probabilities_labels: None,
				target_encoder: Some(&encoder),
				target_is_encoded: true,
			},
		)
		.unwrap();
		let table = Table::from_path(&path).unwrap();
		assert_eq!(table.column("predictions").unwrap().data, vec!["neg", "pos"]);
		assert_eq!(table.column("truth").unwrap().data, vec!["neg", "pos"]);
	}

	#[test]
	fn test_save_predictions_backs_up_existing_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("predictions.csv");
		std::fs::write(&path, "old").unwrap();
		let predictions = vec!["1.0".to_owned()];
		let truth = vec!["2.0".to_owned()];
		save_predictions(
			&path,
			SavePredictionsOptions {
				predictions: &predictions,
				truth: &truth,
				probabilities: None,
				probabilities_labels: None,
				target_encoder: None,
				target_is_encoded: false,
			},
		)
		.unwrap();
		assert!(dir.path().join("backup").is_dir());
	}
}
