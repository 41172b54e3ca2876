use std::collections::BTreeMap;
use std::path::Path;

/// The structured side-file a framework integration writes next to its predictions. Every field is optional: a framework that failed to start never writes one.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Metadata {
	pub framework: Option<String>,
	pub version: Option<String>,
	pub framework_version: Option<String>,
	pub framework_params: Option<serde_json::Value>,
	pub seed: Option<i64>,
	/// The primary metric for this run.
	pub metric: Option<String>,
	/// The full list of metric names to compute.
	pub metrics: Option<Vec<String>>,
	/// Any other fields the run chose to record; they pass through into the score record unmodified.
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}

impl Metadata {
	/// The framework version, whichever of the two accepted keys the run used.
	pub fn resolved_version(&self) -> Option<&str> {
		self.version
			.as_deref()
			.or_else(|| self.framework_version.as_deref())
	}

	/// The framework hyperparameters rendered for the ledger, or an empty string when absent or empty.
	pub fn params_repr(&self) -> String {
		match &self.framework_params {
			None | Some(serde_json::Value::Null) => String::new(),
			Some(serde_json::Value::Object(map)) if map.is_empty() => String::new(),
			Some(params) => params.to_string(),
		}
	}
}

/// Load the metadata side-file. Absence is not an error: scoring proceeds with an all-unset metadata object. A malformed file is reported and treated the same way.
pub fn load_metadata(path: &Path) -> Metadata {
	log::info!("Loading metadata from `{}`.", path.display());
	if !path.is_file() {
		log::warn!(
			"Metadata file `{}` is missing: framework either couldn't start or implementation doesn't save metadata.",
			path.display()
		);
		return Metadata::default();
	}
	let parsed = std::fs::read_to_string(path)
		.map_err(anyhow::Error::from)
		.and_then(|text| Ok(serde_json::from_str(&text)?));
	match parsed {
		Ok(metadata) => metadata,
		Err(error) => {
			log::error!(
				"Failed to parse metadata file `{}`: {:#}",
				path.display(),
				error
			);
			Metadata::default()
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_missing_file_yields_default() {
		let dir = tempfile::tempdir().unwrap();
		let metadata = load_metadata(&dir.path().join("metadata.json"));
		assert!(metadata.framework.is_none());
		assert!(metadata.metrics.is_none());
	}

	#[test]
	fn test_parse_with_extra_fields() {
		let text = r#"{
			"framework": "h2o",
			"framework_version": "3.32",
			"seed": 42,
			"metric": "auc",
			"metrics": ["auc", "acc"],
			"framework_params": {"nthreads": 4},
			"custom_field": "custom_value"
		}"#;
		let metadata: Metadata = serde_json::from_str(text).unwrap();
		assert_eq!(metadata.framework.as_deref(), Some("h2o"));
		assert_eq!(metadata.resolved_version(), Some("3.32"));
		assert_eq!(metadata.seed, Some(42));
		assert_eq!(metadata.metrics.as_ref().unwrap().len(), 2);
		assert_eq!(metadata.params_repr(), r#"{"nthreads":4}"#);
		assert_eq!(
			metadata.extra.get("custom_field").unwrap().as_str(),
			Some("custom_value")
		);
	}

	#[test]
	fn test_version_key_takes_precedence() {
		let metadata: Metadata =
			serde_json::from_str(r#"{"version": "1.0", "framework_version": "2.0"}"#).unwrap();
		assert_eq!(metadata.resolved_version(), Some("1.0"));
	}

	#[test]
	fn test_params_repr_empty_forms() {
		assert_eq!(Metadata::default().params_repr(), "");
		let metadata: Metadata = serde_json::from_str(r#"{"framework_params": {}}"#).unwrap();
		assert_eq!(metadata.params_repr(), "");
	}
}
