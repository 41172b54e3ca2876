/*!
This module ties a (task, fold) pair to its artifacts on disk and turns them into a `ScoreRecord`: it loads the predictions and metadata, evaluates the requested metrics with per-metric failure isolation, and fills in the fixed ledger fields.
*/

use crate::config::Config;
use crate::identity::parse_predictions_file;
use crate::metadata::{load_metadata, Metadata};
use crate::results::{load_predictions, ResultRecord};
use crate::scoreboard::{ScoreRecord, FIXED_COLUMNS};
use anyhow::Result;
use benchscore_util::datetime::datetime_iso;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct TaskDef {
	pub id: String,
	pub name: String,
}

impl TaskDef {
	/// A task known only by name, with the name standing in for the id.
	pub fn new(name: &str) -> Self {
		Self {
			id: name.to_owned(),
			name: name.to_owned(),
		}
	}
}

/// A source of benchmark definitions, used to resolve a task name into its full definition.
pub trait TaskProvider {
	fn benchmark_definition(&self, benchmark_name: &str) -> Result<Vec<TaskDef>>;
}

/// Timing and capacity facts about the run itself, known to the runner but not recoverable from the predictions artifact.
#[derive(Debug, Clone, Default)]
pub struct MetaResult {
	pub training_duration: Option<f64>,
	pub predict_duration: Option<f64>,
	pub models_count: Option<i64>,
	/// Any other fields to pass through into the score record as dynamic columns.
	pub extra: BTreeMap<String, String>,
}

/// Optional overrides for `compute_scores`. Every unset field falls back to the metadata side-file or the artifacts on disk.
#[derive(Default)]
pub struct ScoreOptions {
	pub framework_name: Option<String>,
	pub metrics: Option<Vec<String>>,
	pub result: Option<ResultRecord>,
	pub meta_result: Option<MetaResult>,
}

pub struct TaskResult<'a> {
	pub task: TaskDef,
	pub fold: usize,
	pub constraint: String,
	pub predictions_dir: PathBuf,
	config: &'a Config,
}

impl<'a> TaskResult<'a> {
	pub fn new(task: TaskDef, fold: usize, constraint: &str, config: &'a Config) -> Self {
		Self {
			task,
			fold,
			constraint: constraint.to_owned(),
			predictions_dir: config.predictions_dir.clone(),
			config,
		}
	}

	pub fn with_predictions_dir(
		task: TaskDef,
		fold: usize,
		constraint: &str,
		predictions_dir: PathBuf,
		config: &'a Config,
	) -> Self {
		Self {
			task,
			fold,
			constraint: constraint.to_owned(),
			predictions_dir,
			config,
		}
	}

	pub fn predictions_file(&self) -> PathBuf {
		self.predictions_dir
			.join(&self.task.name)
			.join(self.fold.to_string())
			.join("predictions.csv")
	}

	pub fn metadata_file(&self) -> PathBuf {
		self.predictions_dir
			.join(&self.task.name)
			.join(self.fold.to_string())
			.join("metadata.json")
	}

	pub fn load_result(&self) -> ResultRecord {
		load_predictions(&self.predictions_file(), self.config)
	}

	pub fn load_metadata(&self) -> Metadata {
		load_metadata(&self.metadata_file())
	}

	/// Compute the score record for this (task, fold) pair.
	///
	/// The metric list comes from the options, then the metadata, then the configured catalog for the result's task type. Each metric is evaluated in isolation: a metric that fails to score yields NaN in its column and appends its diagnostic to the `info` field, without disturbing the other metrics. The `result` column carries the primary metric's score, where the primary metric is the one named by the metadata or, failing that, the first of the metric list.
	pub fn compute_scores(&self, options: ScoreOptions) -> ScoreRecord {
		let metadata = self.load_metadata();
		let result = options.result.unwrap_or_else(|| self.load_result());
		let meta_result = options.meta_result.unwrap_or_default();
		let metric_names: Vec<String> = options
			.metrics
			.or_else(|| metadata.metrics.clone())
			.or_else(|| {
				result
					.task_type()
					.map(|task_type| self.config.metrics.for_task_type(task_type).to_vec())
			})
			.unwrap_or_default();
		let mut record = ScoreRecord {
			id: self.task.id.clone(),
			task: self.task.name.clone(),
			framework: options
				.framework_name
				.or_else(|| metadata.framework.clone())
				.unwrap_or_default(),
			constraint: self.constraint.clone(),
			fold: self.fold,
			metric: metadata
				.metric
				.clone()
				.or_else(|| metric_names.first().cloned())
				.unwrap_or_default(),
			mode: self.config.run_mode.clone(),
			version: metadata.resolved_version().unwrap_or_default().to_owned(),
			params: metadata.params_repr(),
			app_version: self.config.app_version.clone(),
			utc: datetime_iso(),
			seed: metadata.seed,
			training_duration: meta_result.training_duration.unwrap_or(f64::NAN),
			predict_duration: meta_result.predict_duration.unwrap_or(f64::NAN),
			models_count: meta_result.models_count,
			..ScoreRecord::default()
		};
		let mut scoring_errors = Vec::new();
		let mut do_score = |metric: &str| {
			let (score, error) = result.evaluate(metric);
			if let Some(error) = error {
				scoring_errors.push(error);
			}
			score
		};
		for metric in metric_names.iter() {
			let score = do_score(metric);
			record.scores.insert(metric.clone(), score);
		}
		record.result = if record.metric.is_empty() {
			f64::NAN
		} else {
			match record.scores.get(&record.metric).copied() {
				Some(score) => score,
				None => do_score(&record.metric.clone()),
			}
		};
		record.info = itertools::join(
			std::iter::once(result.info().unwrap_or("").to_owned())
				.chain(scoring_errors.into_iter())
				.filter(|message| !message.is_empty()),
			"; ",
		);
		for (key, value) in meta_result.extra.iter() {
			if FIXED_COLUMNS.contains(&key.as_str()) || record.scores.contains_key(key) {
				continue;
			}
			record.extra.insert(key.clone(), value.clone());
		}
		for (key, value) in metadata.extra.iter() {
			if FIXED_COLUMNS.contains(&key.as_str())
				|| record.scores.contains_key(key)
				|| record.extra.contains_key(key)
			{
				continue;
			}
			record.extra.insert(key.clone(), json_to_string(value));
		}
		log::info!(
			"Scored task `{}` fold {}: {} = {}.",
			record.task,
			record.fold,
			record.metric,
			record.result
		);
		record
	}
}

fn json_to_string(value: &serde_json::Value) -> String {
	match value {
		serde_json::Value::String(value) => value.clone(),
		other => other.to_string(),
	}
}

/// Score a standalone predictions artifact whose identity is encoded in its path. The metric list comes from the configured catalog for the result's task type; when the path names a benchmark and a provider is given, the task definition is resolved through it on a best-effort basis.
pub fn score_from_predictions_file(
	path: &Path,
	config: &Config,
	provider: Option<&dyn TaskProvider>,
) -> Option<ScoreRecord> {
	let identity = match parse_predictions_file(path, config) {
		Ok(identity) => identity,
		Err(error) => {
			log::error!(
				"Predictions file `{}` has wrong naming format: {:#}.",
				path.display(),
				error
			);
			return None;
		}
	};
	let mut task = TaskDef::new(&identity.task);
	if let (Some(provider), Some(benchmark)) = (provider, &identity.benchmark) {
		match provider.benchmark_definition(benchmark) {
			Ok(tasks) => {
				if let Some(found) = tasks.into_iter().find(|task| task.name == identity.task) {
					task = found;
				}
			}
			Err(error) => log::warn!(
				"Failed to load benchmark definition `{}`: {:#}.",
				benchmark,
				error
			),
		}
	}
	let result = load_predictions(path, config);
	let metrics = result
		.task_type()
		.map(|task_type| config.metrics.for_task_type(task_type).to_vec());
	let task_result = TaskResult::with_predictions_dir(
		task,
		identity.fold,
		identity.constraint.as_deref().unwrap_or(""),
		PathBuf::new(),
		config,
	);
	Some(task_result.compute_scores(ScoreOptions {
		framework_name: Some(identity.framework),
		metrics,
		result: Some(result),
		meta_result: None,
	}))
}
