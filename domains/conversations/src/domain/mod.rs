//! Domain layer for the Conversations domain

pub mod controller;
pub mod entities;
