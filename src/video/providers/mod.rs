//! Video generation providers.

mod veo;

pub use veo::VeoProvider;
