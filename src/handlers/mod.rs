// Navigation endpoints served behind the session pipeline.
//
// Public pages render for anyone; guarded pages call `require_user` and let
// the router interpret the outcome (redirect to sign-in, or the 403 body).

pub mod pages;
pub mod session;
