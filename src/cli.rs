use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Pre-generates Zundamon voice lines for zundamahjong through a VOICEVOX engine
#[derive(Parser, Debug)]
#[command(name = "zunda-voicegen")]
#[command(version)]
#[command(about = "Generate VOICEVOX wav assets for zundamahjong", long_about = None)]
pub struct Cli {
    /// VOICEVOX speaker/style id (default: VOICEVOX_SPEAKER or 3, Zundamon normal)
    #[arg(long, global = true)]
    pub speaker: Option<u32>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the in-game call-outs (pon, chi, riichi, ...)
    Calls(GenerateArgs),

    /// Generate the categorized taunts and their manifest.json
    Quotes(GenerateArgs),

    /// Re-record individual lines with hand-tuned prosody
    Retakes(GenerateArgs),

    /// Print the engine URL that would be used, and how it was found
    Resolve(EndpointArgs),

    /// List the engine's speakers and style ids
    Speakers(EndpointArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    /// VOICEVOX engine URL. You can also set VOICEVOX_HOST/VOICEVOX_PORT or VOICEVOX_URL.
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub endpoint: EndpointArgs,

    /// Output directory, created if missing (default depends on the table)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Keep going after a failed line and report the failures at the end
    #[arg(long)]
    pub keep_going: bool,

    /// Pause between lines in milliseconds
    #[arg(long)]
    pub pause_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_args() {
        let cli = Cli::try_parse_from([
            "zunda-voicegen",
            "quotes",
            "--url",
            "http://172.17.0.1:50021",
            "--out",
            "/tmp/quotes",
            "--keep-going",
            "--speaker",
            "1",
        ])
        .unwrap();

        assert_eq!(cli.speaker, Some(1));
        match cli.command {
            Commands::Quotes(args) => {
                assert_eq!(args.endpoint.url.as_deref(), Some("http://172.17.0.1:50021"));
                assert_eq!(args.out, Some(PathBuf::from("/tmp/quotes")));
                assert!(args.keep_going);
                assert_eq!(args.pause_ms, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["zunda-voicegen"]).is_err());
    }
}
