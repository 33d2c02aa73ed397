//! Training-Time Category Vocabularies

use crate::dataset::Value;
use crate::error::VocabularyError;
use crate::schema::{FeatureSlot, FEATURE_DIMENSION};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

/// Fixed category → code table for one feature slot
///
/// Codes follow the order of `categories`; anything outside the table maps to
/// `unseen_code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryVocabulary {
    categories: Vec<String>,
    index: HashMap<String, u32>,
    unseen_code: u32,
}

impl CategoryVocabulary {
    /// Create a vocabulary; `unseen_code` defaults to one past the last category
    pub fn new(categories: Vec<String>, unseen_code: Option<u32>) -> Result<Self, VocabularyError> {
        let mut index = HashMap::with_capacity(categories.len());
        for (code, category) in categories.iter().enumerate() {
            if index.insert(category.clone(), code as u32).is_some() {
                return Err(VocabularyError::DuplicateCategory(category.clone()));
            }
        }

        let unseen_code = unseen_code.unwrap_or(categories.len() as u32);
        if (unseen_code as usize) < categories.len() {
            return Err(VocabularyError::UnseenCodeCollision {
                code: unseen_code,
                categories: categories.len(),
            });
        }

        Ok(Self {
            categories,
            index,
            unseen_code,
        })
    }

    /// Code for a raw cell value
    pub fn code(&self, value: &Value) -> u32 {
        value
            .category_label()
            .and_then(|label| self.index.get(&label).copied())
            .unwrap_or(self.unseen_code)
    }

    /// Categories in code order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Code assigned to missing and never-seen values
    pub fn unseen_code(&self) -> u32 {
        self.unseen_code
    }
}

#[derive(Debug, Deserialize)]
struct VocabularyFile {
    slots: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    unseen_code: Option<u32>,
}

/// Per-slot vocabularies captured when the classifier was trained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingVocabulary {
    slots: [CategoryVocabulary; FEATURE_DIMENSION],
}

impl EncodingVocabulary {
    /// Assemble from one vocabulary per slot, in schema order
    pub fn new(slots: [CategoryVocabulary; FEATURE_DIMENSION]) -> Self {
        Self { slots }
    }

    /// Parse the JSON artifact
    pub fn from_json_str(json: &str) -> Result<Self, VocabularyError> {
        let file: VocabularyFile =
            serde_json::from_str(json).map_err(|e| VocabularyError::Parse(e.to_string()))?;

        if let Some(unknown) = file
            .slots
            .keys()
            .find(|name| FeatureSlot::from_name(name).is_none())
        {
            return Err(VocabularyError::UnknownSlot(unknown.clone()));
        }

        let unseen_code = file.unseen_code;
        let mut slots = file.slots;
        let build = |slot: FeatureSlot, slots: &mut BTreeMap<String, Vec<String>>| {
            let categories = slots
                .remove(slot.as_str())
                .ok_or(VocabularyError::MissingSlot(slot))?;
            CategoryVocabulary::new(categories, unseen_code)
        };

        Ok(Self::new([
            build(FeatureSlot::EducationalLevel, &mut slots)?,
            build(FeatureSlot::AgeCategory, &mut slots)?,
            build(FeatureSlot::ResidenceArea, &mut slots)?,
            build(FeatureSlot::ItnAttitude, &mut slots)?,
        ]))
    }

    /// Load the JSON artifact from disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, VocabularyError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| VocabularyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let vocabulary = Self::from_json_str(&json)?;
        info!("Loaded encoding vocabulary from {}", path.display());
        Ok(vocabulary)
    }

    /// Vocabulary for one slot
    pub fn slot(&self, slot: FeatureSlot) -> &CategoryVocabulary {
        &self.slots[slot.index()]
    }

    pub(crate) fn into_slots(self) -> [CategoryVocabulary; FEATURE_DIMENSION] {
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ARTIFACT: &str = r#"{
        "slots": {
            "educational_level": ["None", "Primary", "Secondary", "Tertiary"],
            "age_category": ["15-24", "25-34", "35+"],
            "residence_area": ["Rural", "Urban"],
            "itn_attitude": ["Dislike", "Neutral", "Like"]
        }
    }"#;

    #[test]
    fn test_codes_follow_training_order() {
        let vocab = EncodingVocabulary::from_json_str(ARTIFACT).unwrap();
        let edu = vocab.slot(FeatureSlot::EducationalLevel);

        assert_eq!(edu.code(&Value::from("None")), 0);
        assert_eq!(edu.code(&Value::from("Tertiary")), 3);
        assert_eq!(edu.unseen_code(), 4);
        assert_eq!(edu.code(&Value::from("Doctorate")), 4);
        assert_eq!(edu.code(&Value::Null), 4);
    }

    #[test]
    fn test_numeric_cells_match_text_categories() {
        let vocab = CategoryVocabulary::new(vec!["0".into(), "1".into()], None).unwrap();
        assert_eq!(vocab.code(&Value::Number(1.0)), 1);
    }

    #[test]
    fn test_missing_slot_rejected() {
        let json = r#"{"slots": {"educational_level": ["a"]}}"#;
        assert!(matches!(
            EncodingVocabulary::from_json_str(json),
            Err(VocabularyError::MissingSlot(FeatureSlot::AgeCategory))
        ));
    }

    #[test]
    fn test_unknown_slot_rejected() {
        let json = r#"{"slots": {"income": ["a"]}}"#;
        assert!(matches!(
            EncodingVocabulary::from_json_str(json),
            Err(VocabularyError::UnknownSlot(name)) if name == "income"
        ));
    }

    #[test]
    fn test_duplicate_and_colliding_codes_rejected() {
        assert!(matches!(
            CategoryVocabulary::new(vec!["a".into(), "a".into()], None),
            Err(VocabularyError::DuplicateCategory(_))
        ));
        assert!(matches!(
            CategoryVocabulary::new(vec!["a".into(), "b".into()], Some(1)),
            Err(VocabularyError::UnseenCodeCollision { code: 1, categories: 2 })
        ));
        assert_eq!(
            CategoryVocabulary::new(vec!["a".into()], Some(99)).unwrap().unseen_code(),
            99
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ARTIFACT.as_bytes()).unwrap();

        let vocab = EncodingVocabulary::from_json_file(file.path()).unwrap();
        assert_eq!(vocab.slot(FeatureSlot::ResidenceArea).categories(), ["Rural", "Urban"]);

        assert!(matches!(
            EncodingVocabulary::from_json_file("/nonexistent/vocab.json"),
            Err(VocabularyError::Io { .. })
        ));
    }
}
