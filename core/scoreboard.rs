/*!
This module defines the `Scoreboard` ledger: a durable, append-only, deduplicated table of score records, one file per (framework, benchmark, task) scope.

Columns are always ordered fixed-columns-first, then the dynamic metric columns in lexicographic order, so a header comparison is a meaningful schema check. When a save would change the schema of an existing file, the old file is backed up before the fresh header is written.
*/

use crate::config::Config;
use crate::identity::{parse_scoreboard_file, ScoreboardScope};
use anyhow::Result;
use benchscore_table::{parse_number, read_header, Table};
use benchscore_util::backup::backup_file;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub const RESULTS_FILE: &str = "results.csv";

pub const FIXED_COLUMNS: &[&str] = &[
	"id",
	"task",
	"framework",
	"constraint",
	"fold",
	"result",
	"metric",
	"mode",
	"version",
	"params",
	"app_version",
	"utc",
	"duration",
	"training_duration",
	"predict_duration",
	"models_count",
	"seed",
	"info",
];

const NANABLE_INT_COLUMNS: &[&str] = &["fold", "models_count", "seed"];
const LOW_PRECISION_FLOAT_COLUMNS: &[&str] =
	&["duration", "training_duration", "predict_duration"];
const TEXT_COLUMNS: &[&str] = &[
	"task",
	"framework",
	"constraint",
	"metric",
	"mode",
	"version",
	"params",
	"app_version",
	"utc",
	"info",
];

/// One row of the ledger. The fixed fields are always present; `scores` holds one entry per computed metric and `extra` holds pass-through fields from the run, both becoming dynamic columns.
#[derive(Debug, Clone)]
pub struct ScoreRecord {
	pub id: String,
	pub task: String,
	pub framework: String,
	pub constraint: String,
	pub fold: usize,
	pub result: f64,
	pub metric: String,
	pub mode: String,
	pub version: String,
	pub params: String,
	pub app_version: String,
	pub utc: String,
	pub duration: f64,
	pub training_duration: f64,
	pub predict_duration: f64,
	pub models_count: Option<i64>,
	pub seed: Option<i64>,
	pub info: String,
	pub scores: BTreeMap<String, f64>,
	pub extra: BTreeMap<String, String>,
}

impl Default for ScoreRecord {
	fn default() -> Self {
		Self {
			id: String::new(),
			task: String::new(),
			framework: String::new(),
			constraint: String::new(),
			fold: 0,
			result: f64::NAN,
			metric: String::new(),
			mode: String::new(),
			version: String::new(),
			params: String::new(),
			app_version: String::new(),
			utc: String::new(),
			duration: f64::NAN,
			training_duration: f64::NAN,
			predict_duration: f64::NAN,
			models_count: None,
			seed: None,
			info: String::new(),
			scores: BTreeMap::new(),
			extra: BTreeMap::new(),
		}
	}
}

impl ScoreRecord {
	fn cell(&self, column: &str) -> String {
		match column {
			"id" => self.id.clone(),
			"task" => self.task.clone(),
			"framework" => self.framework.clone(),
			"constraint" => self.constraint.clone(),
			"fold" => self.fold.to_string(),
			"result" => format_float(self.result),
			"metric" => self.metric.clone(),
			"mode" => self.mode.clone(),
			"version" => self.version.clone(),
			"params" => self.params.clone(),
			"app_version" => self.app_version.clone(),
			"utc" => self.utc.clone(),
			"duration" => format_float(self.duration),
			"training_duration" => format_float(self.training_duration),
			"predict_duration" => format_float(self.predict_duration),
			"models_count" => self
				.models_count
				.map(|value| value.to_string())
				.unwrap_or_default(),
			"seed" => self.seed.map(|value| value.to_string()).unwrap_or_default(),
			"info" => self.info.clone(),
			_ => match self.scores.get(column) {
				Some(score) => format_float(*score),
				None => self.extra.get(column).cloned().unwrap_or_default(),
			},
		}
	}
}

fn format_float(value: f64) -> String {
	if value.is_nan() {
		String::new()
	} else {
		value.to_string()
	}
}

/// Lay a set of records out as a table in the canonical column order: the fixed columns, then the union of dynamic columns sorted lexicographically.
pub fn records_to_table(records: &[ScoreRecord]) -> Table {
	let mut dynamic: BTreeSet<String> = BTreeSet::new();
	for record in records.iter() {
		dynamic.extend(record.scores.keys().cloned());
		dynamic.extend(record.extra.keys().cloned());
	}
	let column_names: Vec<String> = FIXED_COLUMNS
		.iter()
		.map(|name| (*name).to_owned())
		.chain(dynamic.into_iter())
		.collect();
	let mut table = Table::new(column_names.clone());
	for record in records.iter() {
		let row = column_names
			.iter()
			.map(|column| record.cell(column))
			.collect();
		table.push_row(row);
	}
	table
}

#[derive(Debug, Clone)]
pub struct Scoreboard {
	pub scores: Table,
	pub framework_name: Option<String>,
	pub benchmark_name: Option<String>,
	pub task_name: Option<String>,
	pub scores_dir: PathBuf,
	token_separator: String,
}

impl Scoreboard {
	/// A board holding the given scores, without touching the filesystem.
	pub fn with_scores(scores: Table, scope: ScoreboardScope, config: &Config) -> Self {
		Self {
			scores,
			framework_name: scope.framework_name,
			benchmark_name: scope.benchmark_name,
			task_name: scope.task_name,
			scores_dir: config.scores_dir.clone(),
			token_separator: config.token_separator.clone(),
		}
	}

	/// A board holding the given records.
	pub fn from_records(records: &[ScoreRecord], scope: ScoreboardScope, config: &Config) -> Self {
		Self::with_scores(records_to_table(records), scope, config)
	}

	/// Load the board for a scope from its backing file. A nonexistent file yields an empty board.
	pub fn load(scope: ScoreboardScope, config: &Config) -> Result<Self> {
		let mut board = Self::with_scores(Table::empty(), scope, config);
		board.scores = load_table(&board.score_file())?;
		Ok(board)
	}

	/// The global ledger, unscoped.
	pub fn all(config: &Config) -> Result<Self> {
		Self::load(ScoreboardScope::default(), config)
	}

	/// Interpret a path as a ledger file and load it. Returns `Ok(None)` when the name is not a recognized ledger name.
	pub fn from_file(path: &Path, config: &Config) -> Result<Option<Self>> {
		let scope = match parse_scoreboard_file(path, config) {
			Some(scope) => scope,
			None => return Ok(None),
		};
		let mut board = Self::with_scores(Table::empty(), scope, config);
		if let Some(parent) = path.parent() {
			if parent != Path::new("") {
				board.scores_dir = parent.to_path_buf();
			}
		}
		board.scores = load_table(&board.score_file())?;
		Ok(Some(board))
	}

	/// The scores in canonical column order: fixed columns first, then the dynamic columns sorted lexicographically.
	pub fn as_table(&self) -> Table {
		if self.scores.columns.is_empty() {
			return self.scores.clone();
		}
		let mut dynamic: Vec<String> = self
			.scores
			.column_names()
			.into_iter()
			.filter(|name| !FIXED_COLUMNS.contains(name))
			.map(|name| name.to_owned())
			.collect();
		dynamic.sort();
		let column_names: Vec<String> = FIXED_COLUMNS
			.iter()
			.map(|name| (*name).to_owned())
			.chain(dynamic.into_iter())
			.collect();
		let table = self.scores.reindex(&column_names);
		log::debug!("Scores columns: {:?}.", table.column_names());
		table
	}

	/// A derived copy with presentation formatting applied: identifier and nullable integer columns rendered plainly with blanks for missing values, duration columns with one decimal digit, and the remaining numeric columns with six significant digits. The in-memory scores are left untouched.
	pub fn as_printable_table(&self) -> Table {
		let mut table = self.as_table();
		table.map_column("id", |cell| str_print(cell));
		for column in NANABLE_INT_COLUMNS.iter() {
			table.map_column(column, |cell| int_print(cell));
		}
		for column in LOW_PRECISION_FLOAT_COLUMNS.iter() {
			table.map_column(column, |cell| match parse_cell(cell) {
				Some(value) => format!("{:.1}", value),
				None => str_print(cell),
			});
		}
		let float_columns: Vec<String> = table
			.columns
			.iter()
			.filter(|column| {
				!FIXED_COLUMNS.contains(&column.name.as_str()) || column.name == "result"
			})
			.filter(|column| !TEXT_COLUMNS.contains(&column.name.as_str()))
			.filter(|column| {
				column
					.data
					.iter()
					.any(|cell| parse_cell(cell).is_some())
					&& column
						.data
						.iter()
						.all(|cell| is_blank(cell) || parse_number(cell).is_ok())
			})
			.map(|column| column.name.clone())
			.collect();
		for column in float_columns.iter() {
			table.map_column(column, |cell| match parse_cell(cell) {
				Some(value) => format_significant(value, 6),
				None => String::new(),
			});
		}
		table
	}

	/// Save this board's scores to its backing file, backing the file up first when its schema differs, and appending without a header rewrite when `append` is requested and the schema matches.
	pub fn save(&self, append: bool) -> Result<()> {
		save_table(&self.as_printable_table(), &self.score_file(), append)
	}

	/// Merge another collection of rows into this board, yielding a new board with the same scope. Exact-duplicate rows are dropped unless `no_duplicates` is false, keeping the first occurrence.
	pub fn append_table(&self, other: &Table, no_duplicates: bool) -> Scoreboard {
		let mut scores = self.scores.clone();
		scores.append_rows(other);
		if no_duplicates {
			scores.drop_duplicate_rows();
		}
		Scoreboard {
			scores,
			framework_name: self.framework_name.clone(),
			benchmark_name: self.benchmark_name.clone(),
			task_name: self.task_name.clone(),
			scores_dir: self.scores_dir.clone(),
			token_separator: self.token_separator.clone(),
		}
	}

	pub fn append(&self, other: &Scoreboard, no_duplicates: bool) -> Scoreboard {
		self.append_table(&other.scores, no_duplicates)
	}

	pub fn append_records(&self, records: &[ScoreRecord], no_duplicates: bool) -> Scoreboard {
		self.append_table(&records_to_table(records), no_duplicates)
	}

	/// The backing file for this board's scope. Precedence: framework+task, framework+benchmark, framework, task, benchmark, then the global default file.
	pub fn score_file(&self) -> PathBuf {
		let sep = &self.token_separator;
		let file_name = match (&self.framework_name, &self.task_name, &self.benchmark_name) {
			(Some(framework), Some(task), _) => {
				format!("{}{sep}task{sep}{}.csv", framework, task, sep = sep)
			}
			(Some(framework), None, Some(benchmark)) => {
				format!("{}{sep}benchmark{sep}{}.csv", framework, benchmark, sep = sep)
			}
			(Some(framework), None, None) => format!("{}.csv", framework),
			(None, Some(task), _) => format!("task{sep}{}.csv", task, sep = sep),
			(None, None, Some(benchmark)) => format!("benchmark{sep}{}.csv", benchmark, sep = sep),
			(None, None, None) => RESULTS_FILE.to_owned(),
		};
		self.scores_dir.join(file_name)
	}
}

fn load_table(path: &Path) -> Result<Table> {
	log::debug!("Loading scores from `{}`.", path.display());
	if path.is_file() {
		Table::from_path(path)
	} else {
		Ok(Table::empty())
	}
}

/// Write a table of scores to `path`. An existing file whose header differs is a format change: it is backed up and replaced with a fresh header. With a matching header and `append` requested, rows are appended without rewriting the header; any other combination is a full rewrite.
pub fn save_table(table: &Table, path: &Path, append: bool) -> Result<()> {
	let existing_header = read_header(path)?;
	let exists = existing_header.is_some();
	let new_format = match &existing_header {
		Some(header) => {
			header.iter().map(|name| name.as_str()).collect::<Vec<_>>() != table.column_names()
		}
		None => false,
	};
	if new_format || (exists && !append) {
		backup_file(path)?;
	}
	let new_file = !exists || !append || new_format;
	log::debug!("Saving scores to `{}`.", path.display());
	if new_file {
		table.to_path(path)?;
	} else {
		table.append_to_path(path)?;
	}
	log::info!("Scores saved to `{}`.", path.display());
	Ok(())
}

fn is_blank(cell: &str) -> bool {
	cell.is_empty() || cell == "None" || cell == "nan" || cell == "NaN"
}

fn parse_cell(cell: &str) -> Option<f64> {
	if is_blank(cell) {
		return None;
	}
	parse_number(cell).ok().filter(|value| !value.is_nan())
}

fn str_print(cell: &str) -> String {
	if is_blank(cell) {
		String::new()
	} else {
		cell.to_owned()
	}
}

fn int_print(cell: &str) -> String {
	match parse_cell(cell) {
		Some(value) => (value as i64).to_string(),
		None => str_print(cell),
	}
}

/// Format a value with the given number of significant digits, the way printf's `%g` does: fixed notation in the middle of the range, scientific notation outside it, trailing zeros trimmed.
fn format_significant(value: f64, significant: usize) -> String {
	if !value.is_finite() {
		return value.to_string();
	}
	if value == 0.0 {
		return "0".to_owned();
	}
	let exponent = value.abs().log10().floor() as i32;
	if exponent < -4 || exponent >= significant as i32 {
		let formatted = format!("{:.*e}", significant - 1, value);
		match formatted.find('e') {
			Some(position) => {
				let mantissa = trim_trailing_zeros(&formatted[..position]);
				let exponent_value: i32 = formatted[position + 1..].parse().unwrap_or(0);
				format!(
					"{}e{}{:02}",
					mantissa,
					if exponent_value < 0 { "-" } else { "+" },
					exponent_value.abs()
				)
			}
			None => formatted,
		}
	} else {
		let decimals = (significant as i32 - 1 - exponent).max(0) as usize;
		trim_trailing_zeros(&format!("{:.*}", decimals, value))
	}
}

fn trim_trailing_zeros(value: &str) -> String {
	if value.contains('.') {
		value.trim_end_matches('0').trim_end_matches('.').to_owned()
	} else {
		value.to_owned()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn config_in(dir: &Path) -> Config {
		Config {
			scores_dir: dir.to_path_buf(),
			..Config::default()
		}
	}

	fn record(task: &str, fold: usize, auc: f64) -> ScoreRecord {
		let mut record = ScoreRecord {
			id: format!("openml/{}", task),
			task: task.to_owned(),
			framework: "h2o".to_owned(),
			constraint: "1h4c".to_owned(),
			fold,
			result: auc,
			metric: "auc".to_owned(),
			mode: "local".to_owned(),
			version: "3.32".to_owned(),
			utc: "2021-06-01T13:45:02".to_owned(),
			seed: Some(42),
			models_count: Some(10),
			training_duration: 120.25,
			predict_duration: 1.5,
			..ScoreRecord::default()
		};
		record.scores.insert("auc".to_owned(), auc);
		record.scores.insert("acc".to_owned(), 0.95);
		record
	}

	#[test]
	fn test_score_file_precedence() {
		let config = Config::default();
		let file_name = |scope: ScoreboardScope| {
			Scoreboard::with_scores(Table::empty(), scope, &config)
				.score_file()
				.file_name()
				.unwrap()
				.to_str()
				.unwrap()
				.to_owned()
		};
		assert_eq!(
			file_name(ScoreboardScope {
				framework_name: Some("h2o".to_owned()),
				benchmark_name: Some("small".to_owned()),
				task_name: Some("iris".to_owned()),
			}),
			"h2o_task_iris.csv"
		);
		assert_eq!(
			file_name(ScoreboardScope {
				framework_name: Some("h2o".to_owned()),
				benchmark_name: Some("small".to_owned()),
				task_name: None,
			}),
			"h2o_benchmark_small.csv"
		);
		assert_eq!(
			file_name(ScoreboardScope {
				framework_name: Some("h2o".to_owned()),
				benchmark_name: None,
				task_name: None,
			}),
			"h2o.csv"
		);
		assert_eq!(
			file_name(ScoreboardScope {
				framework_name: None,
				benchmark_name: None,
				task_name: Some("iris".to_owned()),
			}),
			"task_iris.csv"
		);
		assert_eq!(
			file_name(ScoreboardScope {
				framework_name: None,
				benchmark_name: Some("small".to_owned()),
				task_name: None,
			}),
			"benchmark_small.csv"
		);
		assert_eq!(file_name(ScoreboardScope::default()), "results.csv");
	}

	#[test]
	fn test_canonical_column_order() {
		let table = records_to_table(&[record("iris", 0, 0.99)]);
		let names = table.column_names();
		assert_eq!(&names[..FIXED_COLUMNS.len()], FIXED_COLUMNS);
		assert_eq!(&names[FIXED_COLUMNS.len()..], &["acc", "auc"]);
	}

	#[test]
	fn test_save_then_load_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let config = config_in(dir.path());
		let board = Scoreboard::from_records(
			&[record("iris", 0, 0.99), record("iris", 1, 0.97)],
			ScoreboardScope::default(),
			&config,
		);
		board.save(false).unwrap();
		let reloaded = Scoreboard::all(&config).unwrap();
		assert_eq!(reloaded.scores.nrows(), 2);
		assert_eq!(
			reloaded.scores.column_names(),
			board.as_table().column_names()
		);
		assert_eq!(reloaded.scores.column("task").unwrap().data, vec!["iris", "iris"]);
		assert_eq!(reloaded.scores.column("auc").unwrap().data, vec!["0.99", "0.97"]);
		assert_eq!(reloaded.scores.column("seed").unwrap().data, vec!["42", "42"]);
	}

	#[test]
	fn test_append_mode_appends_rows_without_header_rewrite() {
		let dir = tempfile::tempdir().unwrap();
		let config = config_in(dir.path());
		let board = Scoreboard::from_records(
			&[record("iris", 0, 0.99)],
			ScoreboardScope::default(),
			&config,
		);
		board.save(false).unwrap();
		let more = Scoreboard::from_records(
			&[record("iris", 1, 0.97)],
			ScoreboardScope::default(),
			&config,
		);
		more.save(true).unwrap();
		// no backup: the header matched
		assert!(!dir.path().join("backup").exists());
		let reloaded = Scoreboard::all(&config).unwrap();
		assert_eq!(reloaded.scores.nrows(), 2);
	}

	#[test]
	fn test_header_mismatch_backs_up_old_file() {
		let dir = tempfile::tempdir().unwrap();
		let config = config_in(dir.path());
		let board = Scoreboard::from_records(
			&[record("iris", 0, 0.99)],
			ScoreboardScope::default(),
			&config,
		);
		board.save(false).unwrap();
		let mut changed = record("iris", 1, 0.97);
		changed.scores.insert("balacc".to_owned(), 0.9);
		let next = Scoreboard::from_records(&[changed], ScoreboardScope::default(), &config);
		next.save(true).unwrap();
		assert!(dir.path().join("backup").is_dir());
		let reloaded = Scoreboard::all(&config).unwrap();
		assert_eq!(reloaded.scores.nrows(), 1);
		assert!(reloaded.scores.column("balacc").is_some());
	}

	#[test]
	fn test_merge_with_self_does_not_grow() {
		let config = Config::default();
		let board = Scoreboard::from_records(
			&[record("iris", 0, 0.99), record("iris", 1, 0.97)],
			ScoreboardScope::default(),
			&config,
		);
		let merged = board.append(&board, true);
		assert_eq!(merged.scores.nrows(), board.scores.nrows());
		let kept = board.append(&board, false);
		assert_eq!(kept.scores.nrows(), 2 * board.scores.nrows());
	}

	#[test]
	fn test_from_file_recognizes_ledger_names() {
		let dir = tempfile::tempdir().unwrap();
		let config = config_in(dir.path());
		let board = Scoreboard::from_file(&dir.path().join("h2o_task_iris.csv"), &config)
			.unwrap()
			.unwrap();
		assert_eq!(board.framework_name.as_deref(), Some("h2o"));
		assert_eq!(board.task_name.as_deref(), Some("iris"));
		assert!(board.scores.is_empty());
		assert!(Scoreboard::from_file(&dir.path().join("notes.txt"), &config)
			.unwrap()
			.is_none());
	}

	#[test]
	fn test_printable_formatting() {
		let config = Config::default();
		let mut sparse = ScoreRecord {
			fold: 1,
			result: 0.123456789,
			training_duration: 120.25,
			..ScoreRecord::default()
		};
		sparse.scores.insert("rmse".to_owned(), 12345678.9);
		let board =
			Scoreboard::from_records(&[sparse], ScoreboardScope::default(), &config);
		let printable = board.as_printable_table();
		assert_eq!(printable.column("fold").unwrap().data, vec!["1"]);
		assert_eq!(printable.column("seed").unwrap().data, vec![""]);
		assert_eq!(printable.column("models_count").unwrap().data, vec![""]);
		assert_eq!(printable.column("duration").unwrap().data, vec![""]);
		assert_eq!(
			printable.column("training_duration").unwrap().data,
			vec!["120.2"]
		);
		assert_eq!(printable.column("result").unwrap().data, vec!["0.123457"]);
		assert_eq!(printable.column("rmse").unwrap().data, vec!["1.23457e+07"]);
		// the in-memory table is untouched
		assert_eq!(
			board.scores.column("result").unwrap().data,
			vec!["0.123456789"]
		);
	}

	#[test]
	fn test_format_significant() {
		assert_eq!(format_significant(0.0, 6), "0");
		assert_eq!(format_significant(1.0, 6), "1");
		assert_eq!(format_significant(0.123456789, 6), "0.123457");
		assert_eq!(format_significant(123456789.0, 6), "1.23457e+08");
		assert_eq!(format_significant(0.0001234, 6), "0.0001234");
		assert_eq!(format_significant(0.00001234, 6), "1.234e-05");
		assert_eq!(format_significant(-2.5, 6), "-2.5");
	}
}
