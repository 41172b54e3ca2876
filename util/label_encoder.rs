use thiserror::Error;

/// Maps class labels to ordinals and back. The ordinal of a label is its index in the ordered class list, so an encoder built from lexicographically sorted classes yields the canonical encoding shared by truth, predictions and probability columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
	classes: Vec<String>,
}

#[derive(Debug, Error)]
#[error("unknown label `{0}`")]
pub struct UnknownLabelError(pub String);

impl LabelEncoder {
	/// Build an encoder from the classes in the order given.
	pub fn from_classes(classes: Vec<String>) -> Self {
		Self { classes }
	}

	pub fn classes(&self) -> &[String] {
		&self.classes
	}

	pub fn transform(&self, label: &str) -> Result<usize, UnknownLabelError> {
		self.classes
			.iter()
			.position(|class| class == label)
			.ok_or_else(|| UnknownLabelError(label.to_owned()))
	}

	pub fn transform_all(&self, labels: &[String]) -> Result<Vec<usize>, UnknownLabelError> {
		labels.iter().map(|label| self.transform(label)).collect()
	}

	pub fn inverse_transform(&self, ordinal: usize) -> Result<&str, UnknownLabelError> {
		self.classes
			.get(ordinal)
			.map(|class| class.as_str())
			.ok_or_else(|| UnknownLabelError(ordinal.to_string()))
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_round_trip() {
		let labels = vec![
			"pos".to_owned(),
			"neg".to_owned(),
			"pos".to_owned(),
			"neg".to_owned(),
		];
		let encoder = LabelEncoder::from_classes(vec!["neg".to_owned(), "pos".to_owned()]);
		assert_eq!(encoder.classes(), &["neg".to_owned(), "pos".to_owned()]);
		let encoded = encoder.transform_all(&labels).unwrap();
		assert_eq!(encoded, vec![1, 0, 1, 0]);
		let decoded: Vec<&str> = encoded
			.iter()
			.map(|ordinal| encoder.inverse_transform(*ordinal).unwrap())
			.collect();
		assert_eq!(decoded, vec!["pos", "neg", "pos", "neg"]);
	}

	#[test]
	fn test_unknown_label() {
		let encoder = LabelEncoder::from_classes(vec!["a".to_owned(), "b".to_owned()]);
		assert!(encoder.transform("c").is_err());
	}
}
