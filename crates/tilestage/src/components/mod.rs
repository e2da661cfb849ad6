pub mod shape;
pub mod vector;
