//! Editor-protocol binding over [`crate::service::LanguageService`].

mod server;

pub use server::{StitchLs, SyntheticTextParams, SyntheticTextResult, serve};
