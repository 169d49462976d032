/// Router Module Index
///
/// Organizes the application's routing logic by surface. The gateway module
/// carries the token-mediated secure-image endpoints; the public module holds
/// the unauthenticated operational endpoints. Everything the gateway guards
/// is enforced inside its handlers (the request gate runs per fetch), so no
/// route-level auth layer is applied here.

/// Operational routes accessible to any client (health probe).
pub mod public;

/// The secure-image gateway surface, nested at /api/secure-images.
pub mod gateway;
