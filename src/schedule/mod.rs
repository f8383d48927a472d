pub mod trigger;
pub mod window;
