/*!
This module defines the `Config` struct, which carries the run-wide settings the scoring components need. Components receive it by reference at construction; there is no process-wide configuration lookup.
*/

use crate::results::TaskType;
use std::path::PathBuf;

#[derive(Debug, serde::Deserialize)]
#[serde(default)]
pub struct Config {
	/// The token used to separate fields in artifact and ledger file names.
	pub token_separator: String,
	/// The directory holding `<task>/<fold>/predictions.csv` artifacts.
	pub predictions_dir: PathBuf,
	/// The directory ledger files are written to.
	pub scores_dir: PathBuf,
	/// When true, predictions are validated strictly before scoring.
	pub test_mode: bool,
	/// The maximum length of the diagnostic message kept from a load error.
	pub error_max_length: usize,
	pub run_mode: String,
	pub app_version: String,
	pub metrics: MetricsCatalog,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			token_separator: "_".to_owned(),
			predictions_dir: PathBuf::from("predictions"),
			scores_dir: PathBuf::from("scores"),
			test_mode: false,
			error_max_length: 200,
			run_mode: "local".to_owned(),
			app_version: env!("CARGO_PKG_VERSION").to_owned(),
			metrics: MetricsCatalog::default(),
		}
	}
}

/// The ordered list of metric names to compute for each task type. The first name in each list is the primary metric for that type.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct MetricsCatalog {
	pub binary: Vec<String>,
	pub multiclass: Vec<String>,
	pub regression: Vec<String>,
}

impl Default for MetricsCatalog {
	fn default() -> Self {
		fn names(names: &[&str]) -> Vec<String> {
			names.iter().map(|name| (*name).to_owned()).collect()
		}
		Self {
			binary: names(&["auc", "logloss", "acc", "balacc"]),
			multiclass: names(&["logloss", "acc", "balacc"]),
			regression: names(&["rmse", "r2", "mae"]),
		}
	}
}

impl MetricsCatalog {
	pub fn for_task_type(&self, task_type: TaskType) -> &[String] {
		match task_type {
			TaskType::Binary => &self.binary,
			TaskType::Multiclass => &self.multiclass,
			TaskType::Regression => &self.regression,
		}
	}
}
