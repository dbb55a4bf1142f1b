pub mod cache;
pub mod common;
pub mod eonet;
pub mod map;
pub mod storm;
pub mod util;
