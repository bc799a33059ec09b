//! LAXMI content service - bilingual site content with a database overlay.
//!
//! Serves the Italian and English UI dictionaries, merging rows edited in
//! the admin dashboard onto the dictionaries bundled with the binary.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - Content stores (Supabase PostgREST, MongoDB)
//! - `cache` - Moka-based caches with tag invalidation
//! - `content` - Dictionary assembly and the dictionary cache
//! - `i18n` - Locales and the bundled static dictionaries
//! - `admin` - Content editing, search and seeding
//! - `permissions` - Admin checking with caching
//! - `server` - axum HTTP API
//! - `utils` - Utility functions

pub mod admin;
pub mod cache;
pub mod config;
pub mod content;
pub mod database;
pub mod error;
pub mod i18n;
pub mod permissions;
pub mod server;
pub mod utils;
