pub mod health;
pub mod manuals;
