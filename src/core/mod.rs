#[cfg(feature = "gui")]
pub mod artwork;
pub mod export;
pub mod normalizer;
pub mod presets;
pub mod session;
pub mod themes;
