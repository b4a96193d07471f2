//! CourseHub - Course and journey storefront
//!
//! This crate sells courses and journeys (course bundles) through Mercado Pago
//! Checkout Pro. Payments are reconciled from gateway notifications, and each
//! approved payment grants enrollments that refunds and chargebacks revoke.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
