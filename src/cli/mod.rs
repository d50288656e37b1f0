use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "trackmybugs-api")]
#[command(about = "TrackMyBugs API server")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Bind address (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Listen port (overrides PORT)")]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_optional() {
        let cli = Cli::parse_from(["trackmybugs-api"]);
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
    }

    #[test]
    fn flags_override() {
        let cli = Cli::parse_from(["trackmybugs-api", "--host", "127.0.0.1", "--port", "9090"]);
        assert_eq!(cli.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(cli.port, Some(9090));
    }
}
