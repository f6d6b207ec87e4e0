//! Authentication: access tokens, the refresh gate and session state.
//!
//! This module provides:
//! - `RefreshGate`: attaches the access token to every call and renews it
//!   once, single-flight, when the API answers 401
//! - `AccessToken`: the in-memory bearer credential
//! - `Session`: the logged-in user, cleared when the session expires
//!
//! Access tokens are short-lived and never written to disk. Renewal relies on
//! the refresh cookie the API sets at login.

pub mod gate;
pub mod session;
pub mod token;

pub use gate::RefreshGate;
pub use session::{Session, SessionData, SessionTeardown};
pub use token::AccessToken;
