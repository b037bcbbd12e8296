//! Image generation providers.

mod gemini;

pub use gemini::GeminiImageProvider;
