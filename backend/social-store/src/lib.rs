//! Persistence layer for persons, their profiles and posts.
//!
//! - `Person` one-to-one `Profile`: deleting the person deletes the profile
//! - `Person` one-to-many `Post` (author): a person with posts cannot be deleted
//! - `Person` many-to-many `Post` (likes): association rows go away with either side
//!
//! `Post.likes` is an independent counter and is never derived from the
//! like association.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod repository;
pub mod store;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use store::{SocialStore, MIGRATOR};
