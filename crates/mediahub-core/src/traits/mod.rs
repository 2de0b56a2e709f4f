//! Core traits defined in `mediahub-core` and implemented by other crates.

pub mod codec;
pub mod option_store;

pub use codec::{CodecError, ImageCodec};
pub use option_store::OptionStore;
