pub mod element;
pub mod engine;
