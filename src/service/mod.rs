pub mod anticipation;
pub mod control_law;
pub mod relevance;
pub mod voice;
