use std::path::PathBuf;

use clap::Parser;

use crosspost::PosterConfig;

#[derive(Parser, Debug)]
#[command(name = "crosspostd")]
#[command(about = "Serving layer for the crosspost posting subsystem")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(short, long, default_value = "8787")]
    pub port: u16,

    /// Directory holding saved sessions (defaults to the platform data dir)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Run posting automation with a visible browser window
    #[arg(long)]
    pub headed: bool,
}

impl Cli {
    /// Resolves the process-wide poster configuration from the flags.
    pub fn poster_config(&self) -> PosterConfig {
        let mut config = PosterConfig::default().with_headless(!self.headed);
        if let Some(dir) = &self.data_dir {
            config = config.with_base_dir(dir.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_loopback() {
        let cli = Cli::try_parse_from(["crosspostd"]).unwrap();
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 8787);
        assert!(!cli.headed);
        assert!(cli.data_dir.is_none());
    }

    #[test]
    fn headed_flag_disables_headless_posting() {
        let cli = Cli::try_parse_from(["crosspostd", "--headed"]).unwrap();
        assert!(!cli.poster_config().headless);
    }

    #[test]
    fn data_dir_overrides_the_session_base() {
        let cli = Cli::try_parse_from(["crosspostd", "--data-dir", "/tmp/sessions"]).unwrap();
        assert_eq!(
            cli.poster_config().base_dir,
            PathBuf::from("/tmp/sessions")
        );
    }

    #[test]
    fn verbose_counts_stack() {
        let cli = Cli::try_parse_from(["crosspostd", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
