mod deploy;
mod render;

pub use deploy::{DeployArgs, cmd_deploy};
pub use render::{RenderAppSpecArgs, RenderArgs, cmd_render, cmd_render_appspec};
