pub mod loader;
pub mod plugin;
pub mod settings;
