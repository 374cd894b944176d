pub mod crypto;
pub mod sync;
