//! Admission control: capacity-safe registration and cancellation.
//!
//! [`AdmissionController`] owns the capacity and duplicate-registration
//! invariants. It delegates the actual check-and-reserve to the store's
//! single atomic operation, maps outcomes onto the
//! [`AdmissionError`](crate::AdmissionError) taxonomy, and publishes the
//! resulting notices without awaiting their delivery.

mod controller;

pub use controller::AdmissionController;
