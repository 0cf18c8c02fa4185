pub mod jass;
