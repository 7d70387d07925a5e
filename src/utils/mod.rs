pub mod config;
pub mod env;
pub mod fd_limit;
pub mod logger;
pub(crate) mod summarize_toml;

pub use config::*;
pub use env::{apply_env_to_opts, load_dotenv};
pub use fd_limit::{cap_file_width, max_files_by_fd_limit, max_open_fds};
pub use logger::setup_logging;
