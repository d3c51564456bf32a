//! Signup/login client for the identity endpoint.
//!
//! # Flow
//!
//! ```text
//! init ── stored token? ──yes──► CheckingSession ──ok──► Authenticated ─► navigate
//!   │                                  └──fail──► clear token ─┐
//!   └──no───────────────────────────────────────────────────── ► Anonymous
//!
//! Anonymous ─open─► ModalOpen ─submit─► Submitting ─login ok──► Authenticated ─► navigate
//!                      ▲                    │
//!                      │                    └─login fail─► register ok ─► RegisteredPendingRedirect
//!                      └──── register fail ("Registration failed. Please try again.")
//! ```
//!
//! The controller is generic over its collaborators so the terminal front
//! end and tests plug in their own [`IdentityClient`], [`SessionStore`],
//! [`FormView`] and [`Navigator`].

mod controller;
mod identity;
mod session;
mod validate;
mod view;

pub use controller::{Key, SignupWidget, WidgetState};
pub use identity::{HttpIdentityClient, IdentityClient, IdentityError};
pub use session::{FileSessionStore, SessionStore};
pub use validate::{Field, FieldError};
pub use view::{FormView, Navigator};

#[cfg(test)]
pub use session::MemorySessionStore;
