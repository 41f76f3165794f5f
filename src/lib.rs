//! # jinglemaker
//!
//! AI JingleMaker 站点的 Rust 核心：促销脚本生成流程、演示音频播放状态、身份认证委托。
//!
//! Core of the AI JingleMaker site: the promotional-script prompt flow, the
//! landing page's demo player state, and the delegated auth routes.
//!
//! ## Overview
//!
//! The only model call is the promo script flow. It validates a keyword
//! string, renders it into a fixed template, asks a hosted model for a JSON
//! reply matching a declared schema, validates that reply and hands back a
//! typed result. Validation failures and backend failures are distinct error
//! variants; neither is retried.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jinglemaker::backend::GeminiBackend;
//! use jinglemaker::config::FlowConfig;
//! use jinglemaker::flows::promo_script::{generate, GenerationRequest};
//!
//! #[tokio::main]
//! async fn main() -> jinglemaker::Result<()> {
//!     jinglemaker::telemetry::init_tracing();
//!
//!     let backend = GeminiBackend::from_config(&FlowConfig::from_env()?)?;
//!     let result = generate(&backend, GenerationRequest::new("radio, upbeat, morning show")).await?;
//!     println!("{}", result.script);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`flows`] | Concrete flows (promo script) |
//! | [`flow`] | Generic validate → render → call → validate runner |
//! | [`prompt`] | Templates and typed prompt definitions |
//! | [`structured`] | Schema generation, validation, JSON extraction |
//! | [`backend`] | Generation backend trait, Gemini and stub backends |
//! | [`transport`] | HTTP transport with bounded timeout |
//! | [`player`] | Demo audio player state machine |
//! | [`auth`] | Identity-provider route delegation |
//! | [`config`] | Flow configuration (defaults, YAML, env) |
//! | [`telemetry`] | Logging setup |

pub mod auth;
pub mod backend;
pub mod config;
pub mod flow;
pub mod flows;
pub mod player;
pub mod prompt;
pub mod structured;
pub mod telemetry;
pub mod transport;

pub use backend::{GenerationBackend, ModelRequest, ModelResponse};
pub use config::FlowConfig;
pub use flow::Flow;
pub use flows::promo_script::{GenerationRequest, GenerationResult};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ServiceErrorKind};
