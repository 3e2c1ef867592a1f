pub mod click;
pub mod wait;

pub use wait::wait_until;
