//! Catering Dashboard
//!
//! Role-based dashboards for a catering business, rendered server-side over
//! an external REST backend.
//!
//! This library provides:
//! - Admin, chef, driver, client and distributor dashboards (Pico CSS)
//! - Order intake with production and delivery workflows
//! - Price list management and analytics
//! - A JSON API mirror of the backend under `/api/`
//! - Server-Sent Events for live updates
//! - An in-memory demo backend

pub mod actions;
pub mod activity;
pub mod api;
pub mod backend;
pub mod bus;
pub mod config;
pub mod domain;
pub mod format;
pub mod routes;
pub mod session;
pub mod ui;
