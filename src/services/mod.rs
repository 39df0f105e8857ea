pub mod fallback;
pub mod links;
pub mod providers;
pub mod recommendations;

pub use fallback::FallbackSelector;
pub use links::{HttpLinkSource, LinkSource, MovieLinkService};
pub use recommendations::RecommendationClient;
