//! Class Index → Label Decoding

use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Label vocabulary the classifier was trained against
///
/// Class index `i` decodes to `classes[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelDecoder {
    classes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DecoderFile {
    classes: Vec<String>,
}

impl LabelDecoder {
    /// Create a decoder; labels must be non-empty and unique
    pub fn new(classes: Vec<String>) -> Result<Self, InferenceError> {
        if classes.is_empty() {
            return Err(InferenceError::ModelLoadError(
                "Label decoder has no classes".to_string(),
            ));
        }
        if let Some(i) = classes.iter().position(|c| c.trim().is_empty()) {
            return Err(InferenceError::ModelLoadError(format!(
                "Label decoder class {} is empty",
                i
            )));
        }
        if let Some(dup) = classes
            .iter()
            .enumerate()
            .find(|&(i, c)| classes[..i].contains(c))
        {
            return Err(InferenceError::ModelLoadError(format!(
                "Label decoder repeats class '{}'",
                dup.1
            )));
        }
        Ok(Self { classes })
    }

    /// Parse `{"classes": [...]}`
    pub fn from_json_str(json: &str) -> Result<Self, InferenceError> {
        let file: DecoderFile = serde_json::from_str(json)
            .map_err(|e| InferenceError::ModelLoadError(format!("Invalid label decoder: {}", e)))?;
        Self::new(file.classes)
    }

    /// Load the JSON artifact from disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        })?;
        let decoder = Self::from_json_str(&json)?;
        info!(
            "Loaded label decoder from {} ({} classes)",
            path.display(),
            decoder.len()
        );
        Ok(decoder)
    }

    /// Label for a class index
    pub fn decode(&self, index: usize) -> Result<&str, InferenceError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(InferenceError::UnknownClass {
                index,
                vocabulary_size: self.classes.len(),
            })
    }

    /// Class index of a label
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    /// Labels in class order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false; construction rejects empty vocabularies
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_decode_every_class() {
        let decoder =
            LabelDecoder::from_json_str(r#"{"classes": ["Does not use ITN", "Uses ITN"]}"#)
                .unwrap();

        for i in 0..decoder.len() {
            let label = decoder.decode(i).unwrap();
            assert!(!label.is_empty());
            assert_eq!(decoder.index_of(label), Some(i));
        }
    }

    #[test]
    fn test_unknown_class() {
        let decoder = LabelDecoder::new(vec!["No".into(), "Yes".into()]).unwrap();
        assert!(matches!(
            decoder.decode(2),
            Err(InferenceError::UnknownClass { index: 2, vocabulary_size: 2 })
        ));
    }

    #[test]
    fn test_invalid_vocabularies_rejected() {
        assert!(LabelDecoder::new(vec![]).is_err());
        assert!(LabelDecoder::new(vec!["Uses ITN".into(), " ".into()]).is_err());
        assert!(LabelDecoder::new(vec!["a".into(), "a".into()]).is_err());
        assert!(LabelDecoder::from_json_str("[\"a\"]").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"classes": ["Does not use ITN", "Uses ITN"]}"#)
            .unwrap();

        let decoder = LabelDecoder::from_json_file(file.path()).unwrap();
        assert_eq!(decoder.decode(1).unwrap(), "Uses ITN");
    }
}
