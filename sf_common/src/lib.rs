mod shillings;

pub mod helpers;
pub mod op;
mod secret;

pub use shillings::Shillings;
pub use secret::Secret;
