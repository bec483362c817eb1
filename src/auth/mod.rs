/// Authentication primitives
///
/// JWT signing/verification and secret hashing. The session module builds
/// its orchestrators on the `TokenSigner` and `SecretHasher` ports defined
/// here.

mod jwt;
mod password;
mod claims;

pub use jwt::JwtSigner;
pub use jwt::TokenSigner;
pub use password::hash_password;
pub use password::verify_password;
pub use password::BcryptHasher;
pub use password::SecretHasher;
pub use password::REFRESH_TOKEN_HASH_COST;
pub use claims::Claims;
