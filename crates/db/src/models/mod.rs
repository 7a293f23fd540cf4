pub mod manual;
