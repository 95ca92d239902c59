use armor_vision::classifier::{
    Activation, DenseLayer, DenseModel, LabelTable, NumberClassifier, NUMBER_PIXELS,
};
use nalgebra::{DMatrix, DVector};

pub const LABELS: [&str; 9] = [
    "1", "2", "3", "4", "5", "outpost", "guard", "base", "negative",
];

pub fn labels() -> LabelTable {
    LabelTable::new(LABELS.iter().map(|s| s.to_string()).collect()).unwrap()
}

/// Model that ignores the crop and favors `label` by `margin` logits.
pub fn constant_model(label: &str, margin: f32) -> DenseModel {
    let idx = LABELS.iter().position(|l| *l == label).unwrap();
    let mut bias = DVector::zeros(LABELS.len());
    bias[idx] = margin;
    let layer = DenseLayer::new(DMatrix::zeros(LABELS.len(), NUMBER_PIXELS), bias, Activation::None)
        .unwrap();
    DenseModel::new(vec![layer]).unwrap()
}

pub fn constant_classifier(label: &str, margin: f32) -> NumberClassifier {
    NumberClassifier::new(constant_model(label, margin), labels()).unwrap()
}

/// Softmax confidence of [`constant_model`].
pub fn constant_confidence(margin: f32) -> f32 {
    margin.exp() / (margin.exp() + (LABELS.len() - 1) as f32)
}
