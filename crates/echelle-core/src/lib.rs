pub mod error;
pub mod consts;
pub mod frame;
pub mod io;
pub mod classify;
pub mod stack;
pub mod stats;
pub mod sequence;
