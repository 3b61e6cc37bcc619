pub mod bs;
pub mod heston;
pub mod iv;
