// Offers: validation, pricing and the atomic creation workflow,
// plus the HTTP handlers that expose them.

pub mod handlers;
pub mod pricing;
pub mod validation;
pub mod workflow;
