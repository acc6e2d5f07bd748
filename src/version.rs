/// Cargo package version of the running binary
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
