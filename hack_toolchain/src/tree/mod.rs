//! Parse tree rendering: XML markup via quick-xml and JSON via serde_json

pub mod xml;

use crate::config::runtime::{TreeFormat, TreeOutputPreferences};
use crate::logging::{codes, Code};
use crate::syntax::Node;
use std::path::{Path, PathBuf};

pub use xml::XmlTreeWriter;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("XML serialization failed: {message}")]
    Xml { message: String },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rendered tree is not valid UTF-8")]
    Encoding,

    #[error("Failed to write tree to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TreeError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Xml { .. } | Self::Json(_) | Self::Encoding => {
                codes::output::SERIALIZATION_FAILED
            }
            Self::Write { .. } => codes::output::WRITE_FAILED,
        }
    }
}

/// Render a tree in the preferred format
pub fn render(node: &Node, preferences: &TreeOutputPreferences) -> TreeResult<String> {
    match preferences.format {
        TreeFormat::Xml => XmlTreeWriter::new(preferences.indent_width).render(node),
        TreeFormat::Json => to_json(node, preferences.pretty_json),
    }
}

pub fn to_json(node: &Node, pretty: bool) -> TreeResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(node)?
    } else {
        serde_json::to_string(node)?
    };
    Ok(json)
}

/// Render and write a tree next to its source, or to `output` when given.
/// Returns the path written.
pub fn write_tree(
    node: &Node,
    source_path: &Path,
    output: Option<&Path>,
    preferences: &TreeOutputPreferences,
) -> TreeResult<PathBuf> {
    let rendered = render(node, preferences)?;
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| source_path.with_extension(preferences.format.extension()));

    std::fs::write(&path, rendered).map_err(|source| TreeError::Write {
        path: path.clone(),
        source,
    })?;

    crate::log_success!(codes::success::OUTPUT_WRITTEN, "Parse tree written",
        "path" => path.display(),
        "format" => preferences.format.extension()
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    const SOURCE: &str = "class Main { function void main() { do Output.printInt(1 + 2); return; } }";

    #[test]
    fn test_json_uses_rule_names() {
        let node = parse_source(SOURCE).unwrap();
        let json = to_json(&node, false).unwrap();
        assert!(json.starts_with("{\"rule\":\"class\""));
        assert!(json.contains("\"rule\":\"subroutineCall\""));
        assert!(json.contains("{\"kind\":\"Identifier\",\"literal\":\"Main\"}"));

        let value: serde_json::Value = serde_json::from_str(&to_json(&node, true).unwrap()).unwrap();
        assert_eq!(value["children"][1]["literal"], "Main");
    }

    #[test]
    fn test_json_rule_nodes_share_one_shape() {
        fn rule_objects<'a>(value: &'a serde_json::Value, out: &mut Vec<&'a serde_json::Value>) {
            if value.get("rule").is_some() {
                out.push(value);
            }
            if let Some(children) = value["children"].as_array() {
                for child in children {
                    rule_objects(child, out);
                }
            }
        }

        let node = parse_source(SOURCE).unwrap();
        let value: serde_json::Value = serde_json::from_str(&to_json(&node, false).unwrap()).unwrap();
        let mut rules = Vec::new();
        rule_objects(&value, &mut rules);

        assert!(rules.iter().all(|rule| rule["closed"].is_boolean()));
        assert_eq!(value["closed"], true);
        // `1 + 2` ends without a closing token
        assert!(rules
            .iter()
            .any(|rule| rule["rule"] == "expression" && rule["closed"] == false));
    }

    #[test]
    fn test_write_tree_next_to_source() {
        let dir = TempDir::new().unwrap();
        let source_path = dir.path().join("Main.jack");
        let node = parse_source(SOURCE).unwrap();

        let written = write_tree(&node, &source_path, None, &TreeOutputPreferences::default()).unwrap();
        let expected_extension = TreeOutputPreferences::default().format.extension();
        assert_eq!(written, source_path.with_extension(expected_extension));
        assert!(std::fs::read_to_string(&written).unwrap().contains("Main"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let node = parse_source(SOURCE).unwrap();
        let missing = dir.path().join("missing").join("Main.xml");
        let result = write_tree(
            &node,
            Path::new("Main.jack"),
            Some(&missing),
            &TreeOutputPreferences::default(),
        );
        assert_matches!(result, Err(TreeError::Write { .. }));
        assert_eq!(result.unwrap_err().error_code(), codes::output::WRITE_FAILED);
    }
}
