use std::path::Path;

use armor_vision_core::{Armor, ArmorSize, ColorImageView};
use log::debug;

use crate::error::ClassifierError;
use crate::extract::{extract_number, NUMBER_PIXELS};
use crate::labels::LabelTable;
use crate::model::{DenseModel, NumberModel};
use crate::params::ClassifierParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Label the model emits for "not an armor".
pub const NEGATIVE_LABEL: &str = "negative";

/// Numerically stable softmax.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

/// True when a label cannot appear on a plate of this size.
pub fn label_conflicts_with_size(label: &str, size: ArmorSize) -> bool {
    match size {
        ArmorSize::Large => matches!(label, "outpost" | "2" | "guard"),
        ArmorSize::Small => matches!(label, "1" | "base"),
    }
}

/// Acceptance rule shared by [`NumberClassifier::filter`].
pub fn keeps_armor(armor: &Armor, params: &ClassifierParams) -> bool {
    let Some(label) = armor.label.as_deref() else {
        return false;
    };
    armor.confidence >= params.threshold
        && label != NEGATIVE_LABEL
        && !params.ignore_classes.iter().any(|c| c == label)
        && !label_conflicts_with_size(label, armor.size)
}

/// Number recognition on armor candidates.
pub struct NumberClassifier<M = DenseModel> {
    model: M,
    labels: LabelTable,
}

impl NumberClassifier<DenseModel> {
    /// Load a JSON dense model and its label file.
    pub fn from_files(
        model_path: impl AsRef<Path>,
        label_path: impl AsRef<Path>,
    ) -> Result<Self, ClassifierError> {
        let model = DenseModel::load_json(model_path)?;
        let labels = LabelTable::load(label_path)?;
        Self::new(model, labels)
    }
}

impl<M: NumberModel> NumberClassifier<M> {
    /// Pair a model with its labels; shapes must agree with the 20x28 crop.
    pub fn new(model: M, labels: LabelTable) -> Result<Self, ClassifierError> {
        if model.input_size() != NUMBER_PIXELS {
            return Err(ClassifierError::ModelShape(format!(
                "model takes {} inputs, number crops have {}",
                model.input_size(),
                NUMBER_PIXELS
            )));
        }
        if model.class_count() != labels.len() {
            return Err(ClassifierError::LabelCountMismatch {
                classes: model.class_count(),
                labels: labels.len(),
            });
        }
        Ok(Self { model, labels })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Attach a number crop to every armor.
    pub fn extract_numbers(&self, frame: &ColorImageView<'_>, armors: &mut [Armor]) {
        for armor in armors {
            armor.number_image = extract_number(frame, armor);
        }
    }

    /// Run the model on every armor carrying a number crop.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, armors), fields(armors = armors.len()))
    )]
    pub fn classify(&self, armors: &mut [Armor]) -> Result<(), ClassifierError> {
        let mut input = Vec::with_capacity(NUMBER_PIXELS);
        for armor in armors.iter_mut() {
            let Some(img) = &armor.number_image else {
                continue;
            };
            input.clear();
            input.extend(img.data.iter().map(|&v| v as f32 / 255.0));

            let probs = softmax(&self.model.forward(&input)?);
            let best = probs
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, &p)| (i, p));
            if let Some((idx, p)) = best {
                armor.label = self.labels.get(idx).map(str::to_owned);
                armor.confidence = p;
            }
        }
        Ok(())
    }

    /// Drop armors failing [`keeps_armor`]. Order is preserved.
    pub fn filter(&self, armors: &mut Vec<Armor>, params: &ClassifierParams) {
        let before = armors.len();
        armors.retain(|a| keeps_armor(a, params));
        debug!("classifier kept {} of {} armors", armors.len(), before);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Activation, DenseLayer};
    use approx::assert_relative_eq;
    use armor_vision_core::{GrayImage, Light, LightColor};
    use nalgebra::{DMatrix, DVector, Point2};

    const LABELS: [&str; 9] = [
        "1", "2", "3", "4", "5", "outpost", "guard", "base", "negative",
    ];

    fn labels() -> LabelTable {
        LabelTable::new(LABELS.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    /// Constant model: ignores the crop and always emits `logits`.
    fn constant_model(logits: [f32; 9]) -> DenseModel {
        let layer = DenseLayer::new(
            DMatrix::zeros(9, NUMBER_PIXELS),
            DVector::from_row_slice(&logits),
            Activation::None,
        )
        .unwrap();
        DenseModel::new(vec![layer]).unwrap()
    }

    fn armor(size: ArmorSize) -> Armor {
        let l = |x: f32| {
            Light::from_axis(
                Point2::new(x, 10.0),
                Point2::new(x, 30.0),
                4.0,
                LightColor::Red,
            )
        };
        let mut a = Armor::new(l(0.0), l(40.0), size);
        a.number_image = Some(GrayImage::new(20, 28));
        a
    }

    fn labelled(label: &str, confidence: f32, size: ArmorSize) -> Armor {
        let mut a = armor(size);
        a.label = Some(label.to_string());
        a.confidence = confidence;
        a
    }

    #[test]
    fn softmax_is_normalized_and_shift_invariant() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert_relative_eq!(p.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        let q = softmax(&[1001.0, 1002.0, 1003.0]);
        for (a, b) in p.iter().zip(&q) {
            assert_relative_eq!(a, b, epsilon = 1e-6);
        }
        assert!(p[2] > p[1] && p[1] > p[0]);
    }

    #[test]
    fn construction_checks_shapes() {
        let short = LabelTable::new(vec!["1".into(), "2".into()]).unwrap();
        assert!(matches!(
            NumberClassifier::new(constant_model([0.0; 9]), short),
            Err(ClassifierError::LabelCountMismatch {
                classes: 9,
                labels: 2
            })
        ));

        let tiny = DenseModel::new(vec![DenseLayer::new(
            DMatrix::zeros(9, 4),
            DVector::zeros(9),
            Activation::None,
        )
        .unwrap()])
        .unwrap();
        assert!(matches!(
            NumberClassifier::new(tiny, labels()),
            Err(ClassifierError::ModelShape(_))
        ));
    }

    #[test]
    fn classify_picks_argmax_with_probability() {
        let mut logits = [0.0; 9];
        logits[2] = 5.0;
        let clf = NumberClassifier::new(constant_model(logits), labels()).unwrap();
        let mut armors = vec![armor(ArmorSize::Small)];
        clf.classify(&mut armors).unwrap();

        let expected = 5.0_f32.exp() / (5.0_f32.exp() + 8.0);
        assert_eq!(armors[0].label.as_deref(), Some("3"));
        assert_relative_eq!(armors[0].confidence, expected, epsilon = 1e-5);
        assert_eq!(armors[0].classification_result(), "3: 94.9%");
    }

    #[test]
    fn classify_skips_armors_without_crops() {
        let clf = NumberClassifier::new(constant_model([1.0; 9]), labels()).unwrap();
        let mut a = armor(ArmorSize::Small);
        a.number_image = None;
        let mut armors = vec![a];
        clf.classify(&mut armors).unwrap();
        assert!(armors[0].label.is_none());
    }

    #[test]
    fn filter_rules() {
        let clf = NumberClassifier::new(constant_model([0.0; 9]), labels()).unwrap();
        let params = ClassifierParams {
            threshold: 0.7,
            ignore_classes: vec!["5".into()],
        };
        let mut armors = vec![
            labelled("3", 0.9, ArmorSize::Small),
            labelled("3", 0.5, ArmorSize::Small),
            labelled("negative", 0.99, ArmorSize::Small),
            labelled("5", 0.99, ArmorSize::Small),
            labelled("outpost", 0.99, ArmorSize::Large),
            labelled("1", 0.99, ArmorSize::Small),
            labelled("1", 0.99, ArmorSize::Large),
            labelled("3", 0.7, ArmorSize::Large),
            armor(ArmorSize::Small),
        ];
        clf.filter(&mut armors, &params);
        let kept: Vec<(&str, ArmorSize)> = armors
            .iter()
            .map(|a| (a.label.as_deref().unwrap(), a.size))
            .collect();
        assert_eq!(
            kept,
            vec![
                ("3", ArmorSize::Small),
                ("1", ArmorSize::Large),
                ("3", ArmorSize::Large)
            ]
        );
    }

    #[test]
    fn raising_threshold_never_adds_armors() {
        let confidences = [0.1, 0.35, 0.5, 0.7, 0.71, 0.95, 1.0];
        let mut previous: Option<Vec<f32>> = None;
        for t in [0.0, 0.3, 0.5, 0.7, 0.9, 1.0] {
            let params = ClassifierParams {
                threshold: t,
                ..Default::default()
            };
            let kept: Vec<f32> = confidences
                .iter()
                .map(|&c| labelled("4", c, ArmorSize::Small))
                .filter(|a| keeps_armor(a, &params))
                .map(|a| a.confidence)
                .collect();
            if let Some(prev) = &previous {
                assert!(kept.iter().all(|c| prev.contains(c)));
            }
            previous = Some(kept);
        }
    }
}
