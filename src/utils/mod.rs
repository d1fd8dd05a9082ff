pub mod helper;

mod bounded_window;
pub use bounded_window::{BoundedWindow, MIN_WINDOW_CAPACITY};
