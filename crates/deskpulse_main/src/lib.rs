mod app;
mod cli;
mod dates;
mod env;
mod log;
mod progress;
mod render;

pub use app::{App, Output};
pub use cli::{Cli, Command};
pub use env::load_environment;
pub use log::{init_tracing, Guard};
