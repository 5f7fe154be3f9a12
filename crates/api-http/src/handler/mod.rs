//! Route Handlers

pub mod analysis;
pub mod fal;
pub mod health;
pub mod pdf;
