use crate::{error::Result, traits::GarmentClassifier, types::SourceImage};

/// Classifier that always answers with the same label
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    pub label: String,
}

impl FixedClassifier {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl GarmentClassifier for FixedClassifier {
    fn classify(&self, _image: &SourceImage) -> Result<String> {
        Ok(self.label.clone())
    }
}
