pub mod delay;
pub mod grating;
pub mod layers;
pub mod material;
pub mod output;
pub mod powers;
pub mod result;
pub mod settings;
pub mod sweep;
