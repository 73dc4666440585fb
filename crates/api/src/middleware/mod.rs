//! Authentication and authorization extractors.
//!
//! - [`auth::Session`] -- the authenticated caller, built from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.
//! - [`rbac::RequireFinance`] -- requires `admin` or `financeiro`.
//! - [`rbac::RequireFinanceRead`] -- requires `admin`, `financeiro` or `viewer`.
//! - [`rbac::RequireAuth`] -- requires any authenticated user.
//! - [`rbac::RequireScheduler`] -- admin, or the scheduler token.

pub mod auth;
pub mod rbac;
