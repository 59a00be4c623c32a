pub mod calibrate;
pub mod compare;
pub mod scan;
