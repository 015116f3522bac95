//! CLI commands

mod args;
mod build;
mod check;
mod deploy;
mod init;
mod publish;

pub use args::BuildArgs;
pub use build::BuildCommand;
pub use check::CheckCommand;
pub use deploy::DeployCommand;
pub use init::InitCommand;
pub use publish::PublishCommand;
