//! # AgentDeck Backend Library
//!
//! Local HTTP backend for a dashboard that manages the configuration artifacts
//! of a developer CLI living under one base directory (by default `~/.claude`):
//! skills (directories with a `SKILL.md` marker), agents (`agents/*.md`), IDE
//! connection lock files, usage statistics and a small settings file.
//!
//! ## Core Components
//!
//! - [`config`]: Layered configuration (embedded defaults, files, environment)
//! - [`layout`]: Well-known paths inside the configuration directory
//! - [`frontmatter`]: YAML frontmatter parsing and rendering for markdown files
//! - [`scanner`]: Recursive `SKILL.md` discovery and tree assembly
//! - [`process`]: PID liveness probing for IDE lock files
//! - [`error`]: Centralized error handling and the JSON error envelope
//! - [`metrics`]: Process-wide counters
//! - [`middleware`]: Security headers, validation, rate limiting, auth and CSRF
//! - [`routes`]: HTTP API endpoint handlers
//! - [`state`]: Shared application state
//! - [`types`]: Data transfer objects

pub mod config;
pub mod error;
pub mod frontmatter;
pub mod layout;
pub mod metrics;
pub mod middleware;
pub mod process;
pub mod routes;
pub mod scanner;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
