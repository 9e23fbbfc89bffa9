//! Command-line arguments.
use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the dontstarve toolkit installer.
#[derive(Parser, Debug)]
#[command(
    name = "dst-install",
    about = "Install the dontstarve server toolkit into the current user's home",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options accepted before or after the subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Artifact bundle root (defaults to $DST_BUNDLE_ROOT, then the
    /// directory holding this executable, then the current directory)
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,

    /// Install into this directory instead of $HOME
    #[arg(long, global = true)]
    pub home: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install units, configuration and executables
    Install(InstallOpts),
    /// Check that everything is installed and up to date
    Verify,
    /// Remove installed units and executables (configuration is kept)
    Uninstall(UninstallOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Verify => "verify",
            Self::Uninstall(_) => "uninstall",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Skip `systemctl --user daemon-reload`
    #[arg(long)]
    pub no_reload: bool,

    /// Enable and start dontstarve.target after reloading
    #[arg(long)]
    pub enable_target: bool,
}

/// Options for the `uninstall` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct UninstallOpts {
    /// Skip `systemctl --user daemon-reload`
    #[arg(long)]
    pub no_reload: bool,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install_defaults() {
        let cli = Cli::parse_from(["dst-install", "install"]);
        assert!(!cli.global.dry_run);
        assert!(cli.global.root.is_none());
        assert!(cli.global.home.is_none());
        assert!(matches!(
            cli.command,
            Command::Install(InstallOpts {
                no_reload: false,
                enable_target: false
            })
        ));
    }

    #[test]
    fn parse_install_dry_run_short() {
        let cli = Cli::parse_from(["dst-install", "-d", "install"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_install_flags() {
        let cli = Cli::parse_from(["dst-install", "install", "--no-reload", "--enable-target"]);
        assert!(
            matches!(
                &cli.command,
                Command::Install(InstallOpts {
                    no_reload: true,
                    enable_target: true
                })
            ),
            "{:?}",
            cli.command
        );
    }

    #[test]
    fn parse_root_and_home_after_subcommand() {
        let cli = Cli::parse_from([
            "dst-install",
            "install",
            "--root",
            "/opt/dst",
            "--home",
            "/tmp/home",
        ]);
        assert_eq!(cli.global.root, Some(std::path::PathBuf::from("/opt/dst")));
        assert_eq!(cli.global.home, Some(std::path::PathBuf::from("/tmp/home")));
    }

    #[test]
    fn parse_verify() {
        let cli = Cli::parse_from(["dst-install", "verify"]);
        assert!(matches!(cli.command, Command::Verify));
        assert_eq!(cli.command.name(), "verify");
    }

    #[test]
    fn parse_uninstall_no_reload() {
        let cli = Cli::parse_from(["dst-install", "uninstall", "--no-reload"]);
        assert!(matches!(
            cli.command,
            Command::Uninstall(UninstallOpts { no_reload: true })
        ));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["dst-install", "-v", "install"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["dst-install", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["dst-install", "upgrade"]).is_err());
    }
}
