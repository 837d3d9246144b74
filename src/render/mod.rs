pub mod connections;
pub mod effects;
pub mod encoder;
pub mod light;
pub mod orchestrator;
pub mod palette;
pub mod poles;
pub mod props;
pub mod quad;
pub mod stack;
pub mod surface;
pub mod tiles;
