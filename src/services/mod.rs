pub mod candidates;
pub mod gemini;
pub mod lunch;
pub mod ocr;
pub mod providers;
pub mod weather;

pub use gemini::GeminiClient;
pub use lunch::LunchService;
pub use ocr::OcrService;
pub use providers::{GeminiProvider, RecommendationProvider, RuleBasedProvider};
pub use weather::WeatherService;
