use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pre-deploy task inference and post-deploy health checks
#[derive(Parser, Debug)]
#[command(
    name = "deployprep",
    about = "Pre-deploy task inference and post-deploy health checks",
    version,
    author,
    long_about = "deployprep configures the build step that must run before a web app \
                  deploy (.NET projects get clean/publish tasks and a publish subpath), \
                  and checks that a freshly deployed site is responding."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Configure pre-deploy tasks for a workspace",
        long_about = "Looks for a single .csproj in the workspace (root or one level down) \
                      and, if found or if the remote runtime is .NET, writes the \
                      preDeployTask/deploySubpath settings and clean/publish tasks.\n\n\
                      Examples:\n  \
                      deployprep configure\n  \
                      deployprep configure /path/to/app --runtime 'DOTNETCORE|8.0'\n  \
                      deployprep configure --format json"
    )]
    Configure(ConfigureArgs),

    #[command(
        about = "Check that a deployed site responds",
        long_about = "Polls the site until it answers without a server error, \
                      giving up after the configured number of attempts.\n\n\
                      Examples:\n  \
                      deployprep check myapp.azurewebsites.net\n  \
                      deployprep check http://localhost:8080 --correlation-id abc123"
    )]
    Check(CheckArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigureArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to workspace (defaults to current directory)"
    )]
    pub workspace: Option<PathBuf>,

    #[arg(
        short = 'r',
        long,
        value_name = "RUNTIME",
        help = "Remote site runtime identifier (linuxFxVersion), e.g. 'DOTNETCORE|8.0'"
    )]
    pub runtime: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    #[arg(value_name = "HOST", help = "Site host name or URL")]
    pub host: String,

    #[arg(long, help = "Site name used in logs (defaults to the host)")]
    pub name: Option<String>,

    #[arg(
        long,
        value_name = "ID",
        help = "Correlation id for log cross-referencing (random if omitted)"
    )]
    pub correlation_id: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
