//! Databases considered during a solve: the layer store and its shared
//! clause carriers.

pub mod clause_box;
pub mod layers;

pub use clause_box::{ClauseBox, LayerClause};
pub use layers::LayerDB;
