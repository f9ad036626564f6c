pub mod access;
pub mod binary;
pub mod mapping;
pub mod slice;
