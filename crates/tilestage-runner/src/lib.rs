pub mod runner;

pub use runner::GameRunner;
