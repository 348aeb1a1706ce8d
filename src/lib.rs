//! Export teaching kit lectures as markdown folder trees with local images.

pub mod cli;
pub mod client;
pub mod config;
pub mod images;
pub mod keywords;
pub mod models;
pub mod writer;

#[cfg(test)]
mod test_support;
