pub mod manuals;
