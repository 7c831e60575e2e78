pub mod mongodb;

pub use mongodb::*;
