pub mod audio;
pub mod level;
pub mod types;
pub mod world;
