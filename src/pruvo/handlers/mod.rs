pub mod health;
pub use self::health::health;

pub mod signup;
pub use self::signup::signup;

pub mod login;
pub use self::login::login;

pub mod update_proofs;
pub use self::update_proofs::update_proofs;

// common validation for the handlers

/// Weak syntactic check, the store is the authority on real addresses
pub fn valid_email(email: &str) -> bool {
    email.contains('@') && email.contains('.')
}

pub fn valid_password(password: &str) -> bool {
    password.len() >= 6
}
