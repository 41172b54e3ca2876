use chrono::Utc;

/// The current UTC datetime in ISO format, second precision, e.g. `2021-06-01T13:45:02`.
pub fn datetime_iso() -> String {
	Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// The current UTC datetime in the compact form used in file names, e.g. `20210601T134502`.
pub fn datetime_compact() -> String {
	Utc::now().format("%Y%m%dT%H%M%S").to_string()
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_datetime_iso_shape() {
		let datetime = datetime_iso();
		assert_eq!(datetime.len(), 19);
		assert_eq!(&datetime[4..5], "-");
		assert_eq!(&datetime[10..11], "T");
	}

	#[test]
	fn test_datetime_compact_shape() {
		let datetime = datetime_compact();
		assert_eq!(datetime.len(), 15);
		assert_eq!(&datetime[8..9], "T");
		assert!(datetime[..8].chars().all(|c| c.is_ascii_digit()));
	}
}
