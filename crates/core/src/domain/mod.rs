pub mod book;
pub mod cart;
