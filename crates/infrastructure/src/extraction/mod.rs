mod gemini;

pub use gemini::GeminiVisionExtractor;
