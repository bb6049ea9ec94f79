/*!
 * Host Facade
 * Wires the sandbox subsystems together behind one shell-facing API
 */

mod builder;
mod manager;

pub use builder::AppHostBuilder;
pub use manager::AppHost;
