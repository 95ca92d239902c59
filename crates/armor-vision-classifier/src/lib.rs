//! Number recognition for armor candidates.
//!
//! ```text
//! armor quad -> perspective crop (20x28) -> Otsu -> NumberModel -> softmax
//!            -> label + confidence -> threshold / ignore / size filter
//! ```
//!
//! The model sits behind the [`NumberModel`] trait; [`DenseModel`] is a small
//! fully-connected network stored as JSON and evaluated with `nalgebra`.

mod classifier;
mod error;
mod extract;
mod labels;
mod model;
mod params;

pub use classifier::{
    keeps_armor, label_conflicts_with_size, softmax, NumberClassifier, NEGATIVE_LABEL,
};
pub use error::ClassifierError;
pub use extract::{extract_number, warp_width, NUMBER_HEIGHT, NUMBER_PIXELS, NUMBER_WIDTH};
pub use labels::LabelTable;
pub use model::{Activation, DenseLayer, DenseModel, NumberModel};
pub use params::ClassifierParams;
