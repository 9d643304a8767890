#[cfg(feature = "cli")]
pub mod cli;
pub mod page_fixture;
pub mod settings;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use page_fixture::PageFixture;
pub use settings::FormSettings;
