//! # Evently
//!
//! `evently` is a small event management API: users register and log in,
//! create events that embed a registration form, and collect attendee
//! registrations through a public link.
//!
//! ## Authentication
//!
//! Passwords are stored as Argon2id PHC strings. A successful login returns a
//! stateless HS256 bearer token (`Authorization: Bearer <token>`) signed with
//! a process-wide secret supplied at startup. Protected routes run behind a
//! middleware that verifies the token and attaches the caller's identity to
//! the request; the middleware never touches the database.
//!
//! ## Events
//!
//! Events belong to the user who created them. Reading a single event and
//! registering for it are public; listing, updating and deleting require the
//! owner's token. Events owned by someone else answer `404 Not Found` rather
//! than `403 Forbidden`.

pub mod api;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
