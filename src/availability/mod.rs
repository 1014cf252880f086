pub mod resolver;
pub mod suspension;
pub mod sync;
