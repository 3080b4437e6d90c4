//! Document-submission client.
//!
//! Developer-friendly goal: keep the public surface small and predictable.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
mod request;
pub mod signals;
pub mod types;

pub use builder::CrptClientBuilder;
pub use core::CrptClient;
pub use request::DOCUMENT_CREATE_PATH;
pub use signals::SignalsSnapshot;
pub use types::{CallStats, CancelHandle};
