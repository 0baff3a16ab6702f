use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

pub const VENVX_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nGlobal options:\n{options}\n";

pub const VENVX_BEFORE_HELP: &str = concat!(
    "venvx ",
    env!("CARGO_PKG_VERSION"),
    " – Python environment and package manager\n\n",
    "\x1b[1;36mEnvironments\x1b[0m\n",
    "  env list         Show detected and registered environments.\n",
    "  env create       Create an environment with venv, poetry, or uv.\n",
    "  env add          Register an existing environment directory.\n",
    "  env activate     Make an environment the target of package commands.\n",
    "  env deactivate   Clear the active environment.\n",
    "  env delete       Remove an environment directory and forget it.\n\n",
    "\x1b[1;36mPackages\x1b[0m\n",
    "  pkg list         List installed packages with updates and unused markers.\n",
    "  pkg install      Install a package, picking a version from the index.\n",
    "  pkg uninstall    Remove a package from the active environment.\n",
    "  pkg update       Upgrade one package, or everything with update-all.\n",
    "  pkg unused       Report packages no workspace source imports.\n",
    "  pkg search       Search the package index.\n\n",
    "\x1b[1;36mRequirements\x1b[0m\n",
    "  reqs import      Install everything listed in a requirements file.\n",
    "  reqs export      Write the active environment's pins to a file.\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "venvx",
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = VENVX_BEFORE_HELP,
    help_template = VENVX_HELP_TEMPLATE
)]
#[allow(clippy::struct_excessive_bools)]
pub struct VenvxCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print)",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        short = 'y',
        long = "yes",
        help = "Answer confirmations with yes and take default choices",
        global = true
    )]
    pub assume_yes: bool,
    #[arg(
        short = 'w',
        long = "workspace",
        value_name = "DIR",
        help = "Workspace root to scan (repeatable; defaults to the current directory)",
        global = true
    )]
    pub workspaces: Vec<PathBuf>,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(subcommand, about = "Discover, create, and activate environments.")]
    Env(EnvCommand),
    #[command(
        subcommand,
        about = "Inspect and change packages in the active environment."
    )]
    Pkg(PkgCommand),
    #[command(subcommand, about = "Import or export requirements files.")]
    Reqs(ReqsCommand),
}

#[derive(Subcommand, Debug)]
pub enum EnvCommand {
    #[command(about = "List detected and registered environments.")]
    List(EnvListArgs),
    #[command(
        about = "Create a new environment.",
        override_usage = "venvx env create [--backend venv|poetry|uv] [--dir DIR]"
    )]
    Create(EnvCreateArgs),
    #[command(about = "Register an existing environment directory.")]
    Add(EnvAddArgs),
    #[command(about = "Activate an environment by path or name.")]
    Activate(EnvTargetArgs),
    #[command(about = "Clear the active environment.")]
    Deactivate,
    #[command(about = "Delete an environment directory and unregister it.")]
    Delete(EnvTargetArgs),
}

#[derive(Args, Debug, Default)]
pub struct EnvListArgs {
    #[arg(
        long,
        value_name = "TEXT",
        help = "Only show environments whose name, path, or type contains TEXT"
    )]
    pub filter: Option<String>,
}

#[derive(Args, Debug)]
pub struct EnvCreateArgs {
    #[arg(long, value_enum, default_value_t = BackendArg::Venv)]
    pub backend: BackendArg,
    #[arg(long, value_name = "DIR", help = "Project directory (defaults to the workspace)")]
    pub dir: Option<PathBuf>,
    #[arg(long, value_name = "NAME", help = "Directory name for venv environments")]
    pub name: Option<String>,
    #[arg(long, value_name = "PYTHON", help = "Interpreter used to create the environment")]
    pub python: Option<String>,
}

#[derive(Args, Debug)]
pub struct EnvAddArgs {
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
    #[arg(long, value_enum, help = "Environment type to record (defaults to venv)")]
    pub kind: Option<KindArg>,
}

#[derive(Args, Debug)]
pub struct EnvTargetArgs {
    #[arg(value_name = "TARGET", help = "Environment path or name")]
    pub target: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendArg {
    Venv,
    Poetry,
    Uv,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindArg {
    Venv,
    Conda,
    Poetry,
    Pipenv,
    Uv,
}

#[derive(Subcommand, Debug)]
pub enum PkgCommand {
    #[command(about = "List installed packages.")]
    List(PkgListArgs),
    #[command(
        about = "Install a package into the active environment.",
        override_usage = "venvx pkg install <NAME> [--version VERSION]"
    )]
    Install(PkgInstallArgs),
    #[command(about = "Uninstall a package from the active environment.")]
    Uninstall(PkgNameArgs),
    #[command(about = "Upgrade a package to its latest release.")]
    Update(PkgNameArgs),
    #[command(
        name = "update-all",
        about = "Upgrade every outdated package, stopping at the first failure."
    )]
    UpdateAll,
    #[command(about = "Report installed packages no workspace source imports.")]
    Unused,
    #[command(about = "Search the package index.")]
    Search(PkgSearchArgs),
}

#[derive(Args, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PkgListArgs {
    #[arg(long, help = "Skip latest-version lookups against the index")]
    pub offline_index: bool,
    #[arg(long = "no-unused", help = "Skip the unused-import scan")]
    pub skip_unused: bool,
}

#[derive(Args, Debug)]
pub struct PkgInstallArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
    #[arg(
        long,
        value_name = "VERSION",
        help = "Install this version instead of choosing one"
    )]
    pub version: Option<String>,
}

#[derive(Args, Debug)]
pub struct PkgNameArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct PkgSearchArgs {
    #[arg(value_name = "QUERY")]
    pub query: String,
}

#[derive(Subcommand, Debug)]
pub enum ReqsCommand {
    #[command(about = "Install a requirements file into the active environment.")]
    Import(ReqsImportArgs),
    #[command(about = "Write pinned requirements (defaults to requirements.txt).")]
    Export(ReqsExportArgs),
}

#[derive(Args, Debug)]
pub struct ReqsImportArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args, Debug, Default)]
pub struct ReqsExportArgs {
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}
