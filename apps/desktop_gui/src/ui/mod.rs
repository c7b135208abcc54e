//! UI layer for the desktop payment app: two-screen shell and navigation bar.

pub mod app;

pub use app::PaymentApp;
