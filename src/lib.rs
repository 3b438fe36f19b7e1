//! # Trailo demo backend
//!
//! `trailo` is a small HTTP backend used for demos and end-to-end testing of
//! Trailo clients. It exposes authentication and user-management endpoints
//! backed by a process-local in-memory store; nothing survives a restart.
//!
//! ## Authentication flow
//!
//! `POST /api/v1/auth/token` checks the submitted email/password against the
//! stored plaintext credential and returns a bearer token of the form
//! `bearer_token_<user-id>` together with the user record. Each login also
//! generates a six-digit one-time verification code which is written to the
//! server log; delivery (email, SMS) is explicitly out of scope for this
//! service. `POST /api/v1/auth/verify-token` consumes that code exactly once.
//!
//! The token format and the `user_<n>` identifier scheme are kept for
//! compatibility with existing clients. They are predictable by design and
//! offer no security; do not put this service anywhere near production.
//!
//! ## User management
//!
//! `/api/v1/users` offers plain CRUD over the in-memory records. Email
//! uniqueness is enforced at creation time only, and updates accept a single
//! field (`display_name`); everything else in the payload is ignored.
//!
//! All three maps (users, credentials, pending codes) live behind a single
//! lock inside [`api::store::UserStore`], so concurrent requests never race
//! on the shared state.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
