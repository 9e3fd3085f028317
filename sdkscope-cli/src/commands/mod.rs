pub mod check;
pub mod common;
pub mod methods;
pub mod versions;

#[cfg(test)]
mod fixtures;
