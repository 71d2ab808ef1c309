pub mod debounce;
pub mod elapsed;
