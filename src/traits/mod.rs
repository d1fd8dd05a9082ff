mod smoother;
pub use smoother::Smoother;
