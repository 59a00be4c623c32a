pub mod fits;
pub mod render;
