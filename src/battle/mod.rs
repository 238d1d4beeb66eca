pub mod calculators;
pub mod catch;
pub mod commands;
pub mod context;
pub mod effectiveness;
pub mod engine;
pub mod state;

#[cfg(test)]
mod tests;
