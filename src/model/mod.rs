mod book;

pub use book::{Book, Region, Review};
