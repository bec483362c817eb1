/// Middleware module
///
/// Access-token validation for protected routes.

mod jwt_middleware;

pub use jwt_middleware::JwtMiddleware;
