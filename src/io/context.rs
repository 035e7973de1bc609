use crate::config::ProductConfig;
use crate::types::{So2Error, So2Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Job parameters handed over by the pipeline in `_context.json`
#[derive(Debug, Clone, Deserialize)]
pub struct JobContext {
    #[serde(default)]
    pub prod_metadata: Map<String, Value>,
    pub prod_type: String,
    /// Directory holding the input product
    pub prod_id: PathBuf,
    pub starttime: String,
    pub endtime: String,
    #[serde(default)]
    pub location: Value,
}

impl JobContext {
    pub fn load<P: AsRef<Path>>(path: P) -> So2Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading job context from {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            So2Error::Config(format!("unable to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content).map_err(|e| match e {
            So2Error::Json(inner) => {
                So2Error::Config(format!("unable to parse {}: {}", path.display(), inner))
            }
            other => other,
        })
    }

    pub fn from_json(content: &str) -> So2Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Abort unless the declared input type is the one this product consumes
    pub fn validate(&self, config: &ProductConfig) -> So2Result<()> {
        if self.prod_type != config.input_type {
            return Err(So2Error::InputTypeMismatch {
                expected: config.input_type.clone(),
                actual: self.prod_type.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: &str = r#"{
        "prod_metadata": {"platform": "Terra", "sensor": "ASTER"},
        "prod_type": "AST_L1T",
        "prod_id": "AST_L1T_00305142019034140_20190515103532_12345",
        "starttime": "2019-05-14T03:41:40.000Z",
        "endtime": "2019-05-14T03:41:49.000Z",
        "location": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}
    }"#;

    #[test]
    fn test_parse_context() {
        let ctx = JobContext::from_json(CONTEXT).unwrap();
        assert_eq!(ctx.prod_type, "AST_L1T");
        assert_eq!(ctx.prod_metadata["sensor"], "ASTER");
        assert_eq!(ctx.location["type"], "Polygon");
        assert!(ctx.validate(&ProductConfig::default()).is_ok());
    }

    #[test]
    fn test_wrong_input_type_names_both() {
        let ctx = JobContext::from_json(&CONTEXT.replace("\"AST_L1T\"", "\"AST_L2\"")).unwrap();
        let err = ctx.validate(&ProductConfig::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("AST_L1T"));
        assert!(msg.contains("AST_L2"));
    }

    #[test]
    fn test_malformed_context_is_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("_context.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JobContext::load(&path), Err(So2Error::Config(_))));
        assert!(matches!(
            JobContext::load(dir.path().join("absent.json")),
            Err(So2Error::Config(_))
        ));
    }
}
