pub mod feedback;
pub mod product;
pub mod user;
