pub mod contact;
pub mod filter;
pub mod physics;
pub mod rng;
pub mod scene;
pub(crate) mod sync;
pub mod time;
