pub mod gemini;
pub mod itinerary;
pub mod utils;
