/*!
This module derives identity from file naming conventions, parameterized by the configured token separator. Both parsers are ordered pattern lists where the first match wins.

A ledger file name encodes an optional framework/benchmark/task scope. A predictions artifact name encodes framework, task and fold, and its run directory optionally encodes framework, benchmark, constraint, mode and datetime.
*/

use crate::config::Config;
use crate::scoreboard::RESULTS_FILE;
use anyhow::{bail, Result};
use regex::Regex;
use std::path::{Component, Path};

/// The identity of one scored (task, fold) pair, derived from a predictions artifact path.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskIdentity {
	pub framework: String,
	pub task: String,
	pub fold: usize,
	pub benchmark: Option<String>,
	pub constraint: Option<String>,
	pub mode: Option<String>,
	pub datetime: Option<String>,
}

/// The scope of a ledger file, derived from its name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreboardScope {
	pub framework_name: Option<String>,
	pub benchmark_name: Option<String>,
	pub task_name: Option<String>,
}

/// Parse a ledger file name into its scope. Not every csv file is a ledger file, so no match is `None`, not an error.
pub fn parse_scoreboard_file(path: &Path, config: &Config) -> Option<ScoreboardScope> {
	let basename = path.file_name()?.to_str()?;
	if basename == RESULTS_FILE {
		return Some(ScoreboardScope::default());
	}
	let sep = regex::escape(&config.token_separator);
	let patterns = [
		format!(
			r"^(?P<framework>[\w\-]+){sep}benchmark{sep}(?P<benchmark>[\w\-]+)\.csv$",
			sep = sep
		),
		format!(r"^benchmark{sep}(?P<benchmark>[\w\-]+)\.csv$", sep = sep),
		format!(
			r"^(?P<framework>[\w\-]+){sep}task{sep}(?P<task>[\w\-]+)\.csv$",
			sep = sep
		),
		format!(r"^task{sep}(?P<task>[\w\-]+)\.csv$", sep = sep),
		r"^(?P<framework>[\w\-]+)\.csv$".to_owned(),
	];
	for pattern in patterns.iter() {
		let regex = Regex::new(pattern).ok()?;
		if let Some(captures) = regex.captures(basename) {
			return Some(ScoreboardScope {
				framework_name: captures.name("framework").map(|m| m.as_str().to_owned()),
				benchmark_name: captures.name("benchmark").map(|m| m.as_str().to_owned()),
				task_name: captures.name("task").map(|m| m.as_str().to_owned()),
			});
		}
	}
	None
}

/// Parse a predictions artifact path into a `TaskIdentity`. The basename must match `<framework><sep><task><sep><fold>.csv`; a run directory component matching `<framework><sep><benchmark><sep><constraint><sep><mode>[<sep><datetime>]` contributes the optional fields.
pub fn parse_predictions_file(path: &Path, config: &Config) -> Result<TaskIdentity> {
	let sep = regex::escape(&config.token_separator);
	let basename = path
		.file_name()
		.and_then(|name| name.to_str())
		.unwrap_or_default();
	let file_pattern = format!(
		r"^(?P<framework>[\w\-]+?){sep}(?P<task>[\w\-]+){sep}(?P<fold>\d+)\.csv$",
		sep = sep
	);
	let file_regex = Regex::new(&file_pattern)?;
	let captures = match file_regex.captures(basename) {
		Some(captures) => captures,
		None => bail!("predictions file `{}` has wrong naming format", path.display()),
	};
	let mut identity = TaskIdentity {
		framework: captures["framework"].to_owned(),
		task: captures["task"].to_owned(),
		fold: captures["fold"].parse()?,
		benchmark: None,
		constraint: None,
		mode: None,
		datetime: None,
	};
	// the datetime-suffixed form goes first: with a single optional-suffix
	// pattern, backtracking would bind the datetime to the mode group
	let folder_patterns = [
		format!(
			r"^(?P<framework>[\w\-]+?){sep}(?P<benchmark>[\w\-]+?){sep}(?P<constraint>[\w\-]+?){sep}(?P<mode>[\w\-]+?){sep}(?P<datetime>\d{{8}}T\d{{6}})$",
			sep = sep
		),
		format!(
			r"^(?P<framework>[\w\-]+?){sep}(?P<benchmark>[\w\-]+){sep}(?P<constraint>[\w\-]+){sep}(?P<mode>[\w\-]+)$",
			sep = sep
		),
	];
	let folder_regexes = folder_patterns
		.iter()
		.map(|pattern| Regex::new(pattern))
		.collect::<Result<Vec<_>, _>>()?;
	if let Some(parent) = path.parent() {
		'components: for component in parent.components().rev() {
			if let Component::Normal(name) = component {
				let name = match name.to_str() {
					Some(name) => name,
					None => continue,
				};
				for folder_regex in folder_regexes.iter() {
					if let Some(captures) = folder_regex.captures(name) {
						identity.benchmark =
							captures.name("benchmark").map(|m| m.as_str().to_owned());
						identity.constraint =
							captures.name("constraint").map(|m| m.as_str().to_owned());
						identity.mode = captures.name("mode").map(|m| m.as_str().to_owned());
						identity.datetime =
							captures.name("datetime").map(|m| m.as_str().to_owned());
						break 'components;
					}
				}
			}
		}
	}
	Ok(identity)
}

#[cfg(test)]
mod test {
	use super::*;

	fn config() -> Config {
		Config::default()
	}

	#[test]
	fn test_scoreboard_default_file() {
		let scope = parse_scoreboard_file(Path::new("results.csv"), &config()).unwrap();
		assert_eq!(scope, ScoreboardScope::default());
	}

	#[test]
	fn test_scoreboard_framework_benchmark() {
		let scope =
			parse_scoreboard_file(Path::new("h2o_benchmark_small.csv"), &config()).unwrap();
		assert_eq!(scope.framework_name.as_deref(), Some("h2o"));
		assert_eq!(scope.benchmark_name.as_deref(), Some("small"));
		assert_eq!(scope.task_name, None);
	}

	#[test]
	fn test_scoreboard_benchmark_only() {
		let scope = parse_scoreboard_file(Path::new("benchmark_small.csv"), &config()).unwrap();
		assert_eq!(scope.framework_name, None);
		assert_eq!(scope.benchmark_name.as_deref(), Some("small"));
	}

	#[test]
	fn test_scoreboard_framework_task() {
		let scope = parse_scoreboard_file(Path::new("h2o_task_iris.csv"), &config()).unwrap();
		assert_eq!(scope.framework_name.as_deref(), Some("h2o"));
		assert_eq!(scope.task_name.as_deref(), Some("iris"));
		assert_eq!(scope.benchmark_name, None);
	}

	#[test]
	fn test_scoreboard_framework_only() {
		let scope = parse_scoreboard_file(Path::new("autosklearn.csv"), &config()).unwrap();
		assert_eq!(scope.framework_name.as_deref(), Some("autosklearn"));
	}

	#[test]
	fn test_scoreboard_unrecognized() {
		assert!(parse_scoreboard_file(Path::new("notes.txt"), &config()).is_none());
	}

	#[test]
	fn test_predictions_file_basename_only() {
		let identity =
			parse_predictions_file(Path::new("h2o_iris_3.csv"), &config()).unwrap();
		assert_eq!(identity.framework, "h2o");
		assert_eq!(identity.task, "iris");
		assert_eq!(identity.fold, 3);
		assert_eq!(identity.benchmark, None);
	}

	#[test]
	fn test_predictions_file_with_run_directory() {
		let path = Path::new(
			"/output/h2o_validation_1h4c_local_20210601T134502/predictions/h2o_iris_0.csv",
		);
		let identity = parse_predictions_file(path, &config()).unwrap();
		assert_eq!(identity.framework, "h2o");
		assert_eq!(identity.task, "iris");
		assert_eq!(identity.fold, 0);
		assert_eq!(identity.benchmark.as_deref(), Some("validation"));
		assert_eq!(identity.constraint.as_deref(), Some("1h4c"));
		assert_eq!(identity.mode.as_deref(), Some("local"));
		assert_eq!(identity.datetime.as_deref(), Some("20210601T134502"));
	}

	#[test]
	fn test_predictions_file_run_directory_without_datetime() {
		let path = Path::new("/output/h2o_validation_1h4c_local/h2o_iris_0.csv");
		let identity = parse_predictions_file(path, &config()).unwrap();
		assert_eq!(identity.benchmark.as_deref(), Some("validation"));
		assert_eq!(identity.datetime, None);
	}

	#[test]
	fn test_predictions_file_bad_name_is_an_error() {
		assert!(parse_predictions_file(Path::new("predictions.csv"), &config()).is_err());
	}
}
