/*!
This module defines the `ResultRecord` model, which interprets a fully loaded predictions table as one of four variants and computes named metrics over it.

`evaluate` never panics and never aborts sibling metrics: an unknown metric name or a failed computation is reported as a NaN score plus an explanatory message.
*/

use crate::config::Config;
use crate::predictions::validate_predictions;
use anyhow::{bail, Error, Result};
use benchscore_metrics as metrics;
use benchscore_table::{parse_number, Table};
use benchscore_util::label_encoder::LabelEncoder;
use ndarray::prelude::*;
use num_traits::ToPrimitive;
use std::path::Path;

/// Build-time policy: when true, predictions and truth are written and read in encoded ordinal form instead of raw labels.
pub const ENCODE_PREDICTIONS_AND_TRUTH: bool = false;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
	Binary,
	Multiclass,
	Regression,
}

impl TaskType {
	pub fn name(&self) -> &'static str {
		match self {
			TaskType::Binary => "binary",
			TaskType::Multiclass => "multiclass",
			TaskType::Regression => "regression",
		}
	}
}

impl std::fmt::Display for TaskType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

#[derive(Debug)]
pub enum ResultRecord {
	/// The predictions artifact is missing.
	NoResult { info: String },
	/// The predictions artifact could not be parsed or produced.
	Error { info: String },
	Classification(ClassificationResult),
	Regression(RegressionResult),
}

impl ResultRecord {
	pub fn missing(info: impl Into<String>) -> Self {
		ResultRecord::NoResult { info: info.into() }
	}

	/// Wrap a load error, truncating its message to `max_length` characters with a trailing ellipsis marker.
	pub fn from_error(error: &Error, max_length: usize) -> Self {
		let message = format!("ResultError: {:#}", error);
		let info = if message.chars().count() <= max_length {
			message
		} else {
			let truncated: String = message.chars().take(max_length.saturating_sub(3)).collect();
			format!("{}...", truncated)
		};
		ResultRecord::Error { info }
	}

	pub fn task_type(&self) -> Option<TaskType> {
		match self {
			ResultRecord::NoResult { .. } | ResultRecord::Error { .. } => None,
			ResultRecord::Classification(result) => Some(result.task_type),
			ResultRecord::Regression(_) => Some(TaskType::Regression),
		}
	}

	fn type_name(&self) -> &'static str {
		self.task_type().map(|t| t.name()).unwrap_or("none")
	}

	pub fn info(&self) -> Option<&str> {
		match self {
			ResultRecord::NoResult { info } | ResultRecord::Error { info } => Some(info),
			_ => None,
		}
	}

	/// Compute one named metric. Absence is not an evaluation error; an unknown name or a failed computation yields NaN plus a message.
	pub fn evaluate(&self, metric: &str) -> (f64, Option<String>) {
		let computed = match self {
			ResultRecord::NoResult { .. } | ResultRecord::Error { .. } => return (f64::NAN, None),
			ResultRecord::Classification(result) => result.compute(metric),
			ResultRecord::Regression(result) => result.compute(metric),
		};
		match computed {
			Some(Ok(score)) => (score, None),
			Some(Err(error)) => {
				log::error!("Failed to compute metric {}: {:#}", metric, error);
				(f64::NAN, Some(format!("scoring {}: {:#}", metric, error)))
			}
			None => {
				log::warn!("Metric {} is not supported for {}!", metric, self.type_name());
				(
					f64::NAN,
					Some(format!(
						"Unsupported metric {} for {}",
						metric,
						self.type_name()
					)),
				)
			}
		}
	}
}

/// Load a predictions artifact and construct the matching `ResultRecord` variant: a missing file yields `NoResult`, a load or parse failure yields `Error`, a table with more than two columns is classified, and a two column table is regression.
pub fn load_predictions(path: &Path, config: &Config) -> ResultRecord {
	log::info!("Loading predictions from `{}`.", path.display());
	if !path.is_file() {
		log::warn!(
			"Predictions file `{}` is missing: framework either failed or could not produce any prediction.",
			path.display()
		);
		return ResultRecord::missing("Missing predictions.");
	}
	match try_load_predictions(path, config) {
		Ok(result) => result,
		Err(error) => ResultRecord::from_error(&error, config.error_max_length),
	}
}

fn try_load_predictions(path: &Path, config: &Config) -> Result<ResultRecord> {
	let table = Table::from_path(path)?;
	if config.test_mode {
		validate_predictions(&table)?;
	}
	if table.ncols() > 2 {
		Ok(ResultRecord::Classification(ClassificationResult::new(
			&table,
		)?))
	} else {
		Ok(ResultRecord::Regression(RegressionResult::new(&table)?))
	}
}

/// A scored classification table. Truth, predictions and class labels are re-encoded into the canonical ordinal space shared with the probability matrix column order, so the metric formulas can assume aligned ordinal labels.
#[derive(Debug)]
pub struct ClassificationResult {
	pub task_type: TaskType,
	pub classes: Vec<String>,
	pub truth: Vec<usize>,
	pub predictions: Vec<usize>,
	pub probabilities: Array2<f64>,
	pub encoder: LabelEncoder,
}

impl ClassificationResult {
	pub fn new(table: &Table) -> Result<Self> {
		let ncols = table.ncols();
		if ncols < 3 {
			bail!("classification predictions require at least one probability column");
		}
		let classes: Vec<String> = table.columns[..ncols - 2]
			.iter()
			.map(|column| column.name.clone())
			.collect();
		let nrows = table.nrows();
		let mut probabilities = Array::zeros((nrows, classes.len()));
		for (column_index, column) in table.columns[..ncols - 2].iter().enumerate() {
			for (row_index, cell) in column.data.iter().enumerate() {
				probabilities[[row_index, column_index]] = parse_number(cell)?;
			}
		}
		let encoder = LabelEncoder::from_classes(classes.clone());
		let predictions = autoencode(&table.columns[ncols - 2].data, &encoder)?;
		let truth = autoencode(&table.columns[ncols - 1].data, &encoder)?;
		let task_type = if classes.len() == 2 {
			TaskType::Binary
		} else {
			TaskType::Multiclass
		};
		Ok(Self {
			task_type,
			classes,
			truth,
			predictions,
			probabilities,
			encoder,
		})
	}

	fn compute(&self, metric: &str) -> Option<Result<f64>> {
		match metric {
			"acc" => Some(Ok(self.acc())),
			"balacc" => Some(Ok(self.balacc())),
			"auc" => Some(self.auc()),
			"mean_pce" => Some(Ok(self.mean_pce())),
			"max_pce" => Some(Ok(self.max_pce())),
			"f1" => Some(self.f1()),
			"logloss" => Some(Ok(self.logloss())),
			_ => None,
		}
	}

	pub fn acc(&self) -> f64 {
		metrics::accuracy(&self.truth, &self.predictions)
	}

	pub fn balacc(&self) -> f64 {
		metrics::balanced_accuracy(&self.truth, &self.predictions, self.classes.len())
	}

	/// AUC is defined for binary classification only; requesting it on multiclass data yields NaN with a warning rather than an error. A non-finite probability cell is a scoring error.
	pub fn auc(&self) -> Result<f64> {
		if self.task_type != TaskType::Binary {
			log::warn!(
				"AUC metric is only supported for binary classification: {:?}.",
				self.classes
			);
			return Ok(f64::NAN);
		}
		let positive_probabilities: Vec<f64> =
			self.probabilities.column(1).iter().copied().collect();
		if positive_probabilities
			.iter()
			.any(|probability| !probability.is_finite())
		{
			bail!("probability column contains non-finite values");
		}
		Ok(metrics::auc_roc(&positive_probabilities, &self.truth))
	}

	/// The confusion matrix over the canonical label set. Exposed directly rather than through `evaluate` since it is not a scalar score.
	pub fn cm(&self) -> Array2<u64> {
		metrics::confusion_matrix(&self.truth, &self.predictions, self.classes.len())
	}

	/// Per-class error rates over the confusion matrix, skipping classes that never occur in the truth.
	fn per_class_errors(&self) -> Vec<f64> {
		metrics::per_class_error_rates(self.cm().view())
			.into_iter()
			.flatten()
			.collect()
	}

	pub fn mean_pce(&self) -> f64 {
		let errors = self.per_class_errors();
		if errors.is_empty() {
			return f64::NAN;
		}
		errors.iter().sum::<f64>() / errors.len().to_f64().unwrap()
	}

	pub fn max_pce(&self) -> f64 {
		self.per_class_errors()
			.into_iter()
			.fold(f64::NAN, f64::max)
	}

	pub fn f1(&self) -> Result<f64> {
		if self.task_type != TaskType::Binary {
			bail!("F1 is only supported for binary classification");
		}
		Ok(metrics::f1(&self.truth, &self.predictions))
	}

	pub fn logloss(&self) -> f64 {
		metrics::log_loss(self.probabilities.view(), &self.truth)
	}
}

fn autoencode(values: &[String], encoder: &LabelEncoder) -> Result<Vec<usize>> {
	let needs_encoding = !ENCODE_PREDICTIONS_AND_TRUTH
		|| values
			.first()
			.map(|value| value.parse::<usize>().is_err())
			.unwrap_or(false);
	if needs_encoding {
		Ok(encoder.transform_all(values)?)
	} else {
		values
			.iter()
			.map(|value| -> Result<usize> { Ok(value.parse()?) })
			.collect()
	}
}

/// A scored regression table. Truth and predictions are coerced to real numbers at construction.
#[derive(Debug)]
pub struct RegressionResult {
	pub truth: Vec<f64>,
	pub predictions: Vec<f64>,
}

impl RegressionResult {
	pub fn new(table: &Table) -> Result<Self> {
		let ncols = table.ncols();
		if ncols != 2 {
			bail!("regression predictions require exactly two columns");
		}
		let parse_column = |column_index: usize| -> Result<Vec<f64>> {
			table.columns[column_index]
				.data
				.iter()
				.map(|cell| parse_number(cell))
				.collect()
		};
		Ok(Self {
			predictions: parse_column(0)?,
			truth: parse_column(1)?,
		})
	}

	fn compute(&self, metric: &str) -> Option<Result<f64>> {
		match metric {
			"mae" => Some(Ok(self.mae())),
			"mse" => Some(Ok(self.mse())),
			"msle" => Some(self.msle()),
			"rmse" => Some(Ok(self.rmse())),
			"rmsle" => Some(self.rmsle()),
			"r2" => Some(Ok(self.r2())),
			_ => None,
		}
	}

	pub fn mae(&self) -> f64 {
		metrics::mean_absolute_error(&self.truth, &self.predictions)
	}

	pub fn mse(&self) -> f64 {
		metrics::mean_squared_error(&self.truth, &self.predictions)
	}

	pub fn msle(&self) -> Result<f64> {
		if self
			.truth
			.iter()
			.chain(self.predictions.iter())
			.any(|value| *value < 0.0)
		{
			bail!("mean squared logarithmic error requires non-negative truth and predictions");
		}
		Ok(metrics::mean_squared_log_error(
			&self.truth,
			&self.predictions,
		))
	}

	pub fn rmse(&self) -> f64 {
		self.mse().sqrt()
	}

	pub fn rmsle(&self) -> Result<f64> {
		Ok(self.msle()?.sqrt())
	}

	pub fn r2(&self) -> f64 {
		metrics::r2_score(&self.truth, &self.predictions)
	}
}
