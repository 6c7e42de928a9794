//! CamionBack backend library
//!
//! Server tier of the CamionBack logistics marketplace: REST API over
//! users, transport requests, offers, ratings and notifications, plus the
//! distance-resolution helper that prices road hauls between Moroccan
//! cities via an upstream distance-matrix API with in-process memoization.

pub mod config;
pub mod database;
pub mod distance;
pub mod errors;
pub mod models;
pub mod roles;
pub mod services;
pub mod utils;
pub mod web;

pub use errors::{AppError, AppResult};
