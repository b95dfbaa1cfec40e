pub mod generator;
pub mod lifecycle;
pub mod sink;
pub mod state_machine;
pub mod variants;
