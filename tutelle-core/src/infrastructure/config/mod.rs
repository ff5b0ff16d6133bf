pub mod policy;
pub mod project;

pub use crate::domain::project::ProjectConfig;
pub use policy::builtin_policy;
pub use project::{find_main_config, load_project_config, load_project_config_with};
