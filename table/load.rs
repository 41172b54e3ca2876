use super::*;
use anyhow::Result;
use std::fs::OpenOptions;
use std::path::Path;

impl Table {
	pub fn from_path(path: &Path) -> Result<Self> {
		Self::from_csv(&mut csv::Reader::from_path(path)?)
	}

	pub fn from_csv<R>(reader: &mut csv::Reader<R>) -> Result<Self>
	where
		R: std::io::Read,
	{
		let column_names: Vec<String> = reader
			.headers()?
			.into_iter()
			.map(|column_name| column_name.to_owned())
			.collect();
		let mut table = Table::new(column_names);
		let mut record = csv::StringRecord::new();
		while reader.read_record(&mut record)? {
			let row: Vec<String> = record.iter().map(|cell| cell.to_owned()).collect();
			table.push_row(row);
		}
		Ok(table)
	}

	/// Write this table to `path` with a header row, creating parent directories as needed and replacing any existing file.
	pub fn to_path(&self, path: &Path) -> Result<()> {
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let file = std::fs::File::create(path)?;
		self.to_writer(file, true)
	}

	/// Append this table's rows to `path` without writing a header row.
	pub fn append_to_path(&self, path: &Path) -> Result<()> {
		let file = OpenOptions::new().append(true).create(true).open(path)?;
		self.to_writer(file, false)
	}

	pub fn to_writer<W>(&self, writer: W, header: bool) -> Result<()>
	where
		W: std::io::Write,
	{
		if self.columns.is_empty() {
			return Ok(());
		}
		let mut writer = csv::Writer::from_writer(writer);
		if header {
			writer.write_record(self.column_names())?;
		}
		for index in 0..self.nrows() {
			writer.write_record(self.row(index))?;
		}
		writer.flush()?;
		Ok(())
	}
}

/// Read just the header row of a csv file. Returns `None` when the file does not exist.
pub fn read_header(path: &Path) -> Result<Option<Vec<String>>> {
	if !path.is_file() {
		return Ok(None);
	}
	let mut reader = csv::Reader::from_path(path)?;
	let header = reader
		.headers()?
		.into_iter()
		.map(|column_name| column_name.to_owned())
		.collect();
	Ok(Some(header))
}

#[test]
fn test_from_csv() {
	let csv = "a,b\n1,x\n2,y\n";
	let mut reader = csv::Reader::from_reader(csv.as_bytes());
	let table = Table::from_csv(&mut reader).unwrap();
	insta::assert_debug_snapshot!(table, @r###"
 Table {
     columns: [
         Column {
             name: "a",
             data: [
                 "1",
                 "2",
             ],
         },
         Column {
             name: "b",
             data: [
                 "x",
                 "y",
             ],
         },
     ],
 }
 "###);
}

#[test]
fn test_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("scores").join("results.csv");
	let mut table = Table::new(vec!["a".to_owned(), "b".to_owned()]);
	table.push_row(vec!["1".to_owned(), "x".to_owned()]);
	table.to_path(&path).unwrap();
	let reloaded = Table::from_path(&path).unwrap();
	assert_eq!(table, reloaded);
}

#[test]
fn test_append_to_path() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("results.csv");
	let mut table = Table::new(vec!["a".to_owned()]);
	table.push_row(vec!["1".to_owned()]);
	table.to_path(&path).unwrap();
	let mut more = Table::new(vec!["a".to_owned()]);
	more.push_row(vec!["2".to_owned()]);
	more.append_to_path(&path).unwrap();
	let reloaded = Table::from_path(&path).unwrap();
	assert_eq!(reloaded.nrows(), 2);
	assert_eq!(reloaded.column("a").unwrap().data, vec!["1", "2"]);
}

#[test]
fn test_read_header() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("results.csv");
	assert!(read_header(&path).unwrap().is_none());
	let table = Table::new(vec!["a".to_owned(), "b".to_owned()]);
	table.to_path(&path).unwrap();
	assert_eq!(
		read_header(&path).unwrap().unwrap(),
		vec!["a".to_owned(), "b".to_owned()]
	);
}
