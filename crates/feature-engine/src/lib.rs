//! Feature Engineering Engine
//!
//! Binds arbitrary survey columns to the four feature slots the ITN usage
//! classifier was trained on and encodes their categorical values into the
//! integer codes the model expects.

mod dataset;
mod encoder;
mod error;
mod mapper;
mod schema;
mod vocabulary;

pub use dataset::{Column, Dataset, Value};
pub use encoder::CategoricalEncoder;
pub use error::{DatasetError, SchemaBindingError, VocabularyError};
pub use mapper::{EncodedFeatureRow, EncodedFeatureTable, FeatureMapper};
pub use schema::{ColumnBinding, FeatureSlot, FEATURE_DIMENSION};
pub use vocabulary::{CategoryVocabulary, EncodingVocabulary};
