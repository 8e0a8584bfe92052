//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod current_account;
pub mod emails;
pub mod forgot;
pub mod identity_store;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod reset_password;
pub mod sign_up;
pub mod token_codec;
pub mod verify_email;

// Re-exports
pub use authenticate::authenticate;
pub use config::AuthConfig;
pub use current_account::CurrentAccountUseCase;
pub use forgot::{ForgotPasswordUseCase, ForgotUsernameUseCase};
pub use identity_store::{IdentityStore, IssuedToken};
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::{LogoutOutcome, LogoutUseCase};
pub use refresh::RefreshUseCase;
pub use reset_password::{ResetPasswordInput, ResetPasswordUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use token_codec::{TokenCodec, TokenKind, VerifiedToken};
pub use verify_email::{RequestEmailVerificationUseCase, VerificationRequest, VerifyEmailUseCase};
