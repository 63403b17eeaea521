pub mod frame;
pub mod input;
pub mod layer;
pub mod player;
