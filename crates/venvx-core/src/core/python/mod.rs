//! Interpreter discovery and the subprocess calls made into environments.

pub mod interpreter;
pub mod pip;
pub mod probe;

pub use interpreter::{executables_dir, find_interpreter};
pub use pip::{create_venv, Pip};
pub use probe::probe_environment;
