/*!
This crate provides a basic implementation of an ordered, string-typed table, which is a two dimensional array of text cells with named columns. Prediction artifacts and score ledgers are tabular text files whose cells only acquire a type at the point of use, so unlike a typical dataframe the cells here stay raw strings and callers parse them on demand with [`parse_number`](fn.parse_number.html).
*/

use anyhow::{format_err, Result};
use fnv::FnvHashSet;

pub mod load;

pub use self::load::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
	pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
	pub name: String,
	pub data: Vec<String>,
}

impl Table {
	/// Create an empty table with the given column names.
	pub fn new(column_names: Vec<String>) -> Self {
		Self {
			columns: column_names
				.into_iter()
				.map(|name| Column {
					name,
					data: Vec::new(),
				})
				.collect(),
		}
	}

	/// Create a table with no columns and no rows.
	pub fn empty() -> Self {
		Self {
			columns: Vec::new(),
		}
	}

	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.data.len()).unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.columns.is_empty() || self.nrows() == 0
	}

	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(|column| column.name.as_str()).collect()
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|column| column.name == name)
	}

	pub fn row(&self, index: usize) -> Vec<&str> {
		self.columns
			.iter()
			.map(|column| column.data[index].as_str())
			.collect()
	}

	/// Append a row. The row must have exactly one cell per column.
	pub fn push_row(&mut self, row: Vec<String>) {
		assert_eq!(
			row.len(),
			self.ncols(),
			"row arity does not match column count"
		);
		for (column, cell) in self.columns.iter_mut().zip(row.into_iter()) {
			column.data.push(cell);
		}
	}

	/// Return a copy of this table with exactly the given columns, in the given order. Columns absent from this table are filled with empty cells.
	pub fn reindex(&self, column_names: &[String]) -> Table {
		let nrows = self.nrows();
		let columns = column_names
			.iter()
			.map(|name| match self.column(name) {
				Some(column) => column.clone(),
				None => Column {
					name: name.clone(),
					data: vec![String::new(); nrows],
				},
			})
			.collect();
		Table { columns }
	}

	/// Append all rows of `other` to this table. Columns of `other` that this table does not have are added at the end, with empty cells for this table's existing rows; columns missing from `other` get empty cells for the appended rows.
	pub fn append_rows(&mut self, other: &Table) {
		if self.columns.is_empty() {
			*self = other.clone();
			return;
		}
		let own_nrows = self.nrows();
		for other_column in other.columns.iter() {
			if self.column(&other_column.name).is_none() {
				self.columns.push(Column {
					name: other_column.name.clone(),
					data: vec![String::new(); own_nrows],
				});
			}
		}
		let other_nrows = other.nrows();
		for column in self.columns.iter_mut() {
			match other.column(&column.name) {
				Some(other_column) => column.data.extend_from_slice(&other_column.data),
				None => column
					.data
					.extend(std::iter::repeat(String::new()).take(other_nrows)),
			}
		}
	}

	/// Remove rows whose cells all equal those of an earlier row, keeping the first occurrence.
	pub fn drop_duplicate_rows(&mut self) {
		let mut seen: FnvHashSet<Vec<String>> = FnvHashSet::default();
		let keep: Vec<bool> = (0..self.nrows())
			.map(|index| {
				let key: Vec<String> = self
					.row(index)
					.into_iter()
					.map(|cell| cell.to_owned())
					.collect();
				seen.insert(key)
			})
			.collect();
		for column in self.columns.iter_mut() {
			let mut keep = keep.iter();
			column.data.retain(|_| *keep.next().unwrap());
		}
	}

	/// Apply a function to every cell of the named column, if present.
	pub fn map_column(&mut self, name: &str, f: impl Fn(&str) -> String) {
		if let Some(column) = self.columns.iter_mut().find(|column| column.name == name) {
			for cell in column.data.iter_mut() {
				*cell = f(cell);
			}
		}
	}
}

/// Parse a cell as a number, treating the empty string as invalid.
pub fn parse_number(value: &str) -> Result<f64> {
	match lexical::parse::<f64, _>(value.trim()) {
		Ok(value) => Ok(value),
		Err(_) => Err(format_err!("invalid number `{}`", value)),
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn table_2x2() -> Table {
		let mut table = Table::new(vec!["a".to_owned(), "b".to_owned()]);
		table.push_row(vec!["1".to_owned(), "x".to_owned()]);
		table.push_row(vec!["2".to_owned(), "y".to_owned()]);
		table
	}

	#[test]
	fn test_push_row_and_access() {
		let table = table_2x2();
		assert_eq!(table.ncols(), 2);
		assert_eq!(table.nrows(), 2);
		assert_eq!(table.row(1), vec!["2", "y"]);
		assert_eq!(table.column("b").unwrap().data, vec!["x", "y"]);
	}

	#[test]
	#[should_panic(expected = "row arity")]
	fn test_push_row_wrong_arity() {
		let mut table = table_2x2();
		table.push_row(vec!["1".to_owned()]);
	}

	#[test]
	fn test_reindex_fills_missing_columns() {
		let table = table_2x2();
		let reindexed = table.reindex(&["b".to_owned(), "c".to_owned()]);
		assert_eq!(reindexed.column_names(), vec!["b", "c"]);
		assert_eq!(reindexed.column("c").unwrap().data, vec!["", ""]);
		assert_eq!(reindexed.column("b").unwrap().data, vec!["x", "y"]);
	}

	#[test]
	fn test_append_rows_with_new_columns() {
		let mut left = table_2x2();
		let mut right = Table::new(vec!["a".to_owned(), "c".to_owned()]);
		right.push_row(vec!["3".to_owned(), "z".to_owned()]);
		left.append_rows(&right);
		assert_eq!(left.column_names(), vec!["a", "b", "c"]);
		assert_eq!(left.nrows(), 3);
		assert_eq!(left.row(2), vec!["3", "", "z"]);
	}

	#[test]
	fn test_drop_duplicate_rows_keeps_first() {
		let mut table = table_2x2();
		table.push_row(vec!["1".to_owned(), "x".to_owned()]);
		table.drop_duplicate_rows();
		assert_eq!(table.nrows(), 2);
		assert_eq!(table.row(0), vec!["1", "x"]);
	}

	#[test]
	fn test_dedup_is_per_cell_not_per_concatenation() {
		// distinct rows whose concatenations agree must both survive
		let mut table = Table::new(vec!["a".to_owned(), "b".to_owned()]);
		table.push_row(vec!["x\u{1f}y".to_owned(), "z".to_owned()]);
		table.push_row(vec!["x".to_owned(), "y\u{1f}z".to_owned()]);
		table.drop_duplicate_rows();
		assert_eq!(table.nrows(), 2);
	}

	#[test]
	fn test_self_append_then_dedup_does_not_grow() {
		let mut table = table_2x2();
		let copy = table.clone();
		table.append_rows(&copy);
		table.drop_duplicate_rows();
		assert_eq!(table.nrows(), 2);
	}

	#[test]
	fn test_parse_number() {
		assert_eq!(parse_number("1.5").unwrap(), 1.5);
		assert!(parse_number("abc").is_err());
		assert!(parse_number("").is_err());
	}
}
