//! Source asset inspection module

pub mod inspector;

pub use inspector::AssetProbe;
