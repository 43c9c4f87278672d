// Numerical methods

mod events;
mod hinit;

pub mod gbs;
pub mod result;
pub mod settings;
