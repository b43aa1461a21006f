pub mod a001_bank;
pub mod a002_product;
