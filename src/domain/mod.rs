//! Domain layer: the probe result model

pub mod model;
