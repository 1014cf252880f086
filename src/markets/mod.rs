pub mod generator;
pub mod selector;
pub mod translate;
