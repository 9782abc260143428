//! Provider-facing descriptors (data) and client authentication strategies (behavior).
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering the HTTPS-only token
//! endpoint, the ordered strategy list, and provider quirks (access-type marker, token field
//! names). `strategy` defines [`ClientAuthMethod`], which decides how credentials travel to the
//! token endpoint.

pub mod descriptor;
pub mod id;
pub mod strategy;

pub use descriptor::*;
pub use id::*;
pub use strategy::*;
