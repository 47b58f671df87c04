//! Admission webhooks for the Appforge platform.
//!
//! The modules mirror the lifecycle of an admission request:
//!
//! - [`registration`] creates the webhook configurations which tell the API
//!   server where to send component admission requests.
//! - [`webhooks`] translates AdmissionReview requests into responses.
//! - [`component`] holds the defaulting and validation rules the handlers
//!   apply, with the DNS label checks living in [`validation`].
//!
//! Serving the handlers over HTTPS is up to the embedding binary, which keeps
//! this crate free of any server and TLS machinery.

pub mod component;
pub mod registration;
pub mod validation;
pub mod webhooks;
