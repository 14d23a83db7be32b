use crate::backends::VoicevoxClient;
use crate::batch::{BatchOptions, BatchRunner, BatchSummary, ItemFailure};
use crate::cli::{Cli, Commands, EndpointArgs, GenerateArgs};
use crate::config_loader::Settings;
use crate::error::VoicegenError;
use crate::lines::{HealthCheck, Table, TableKind};
use crate::resolver::{Endpoint, EndpointResolver, RouteTableGateway, SystemLookup};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum RunError {
    #[error("could not connect to VOICEVOX")]
    Unreachable {
        url: String,
        #[source]
        source: VoicegenError,
    },

    #[error("VOICEVOX responded with an error during healthcheck")]
    Unhealthy(#[source] VoicegenError),

    #[error(transparent)]
    Generation(#[from] ItemFailure),

    #[error("{failed} of {total} voice lines failed")]
    Incomplete { failed: usize, total: usize },

    #[error(transparent)]
    Setup(VoicegenError),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Setup(_) => 1,
            RunError::Unreachable { .. } => 2,
            RunError::Unhealthy(_) => 3,
            RunError::Generation(_) | RunError::Incomplete { .. } => 4,
        }
    }

    /// Prints the error plus whatever hints apply to stderr.
    pub fn report(&self) {
        eprintln!("ERROR: {}", self);
        match self {
            RunError::Unreachable { url, source } => {
                eprintln!("  url: {}", url);
                eprintln!("  Please ensure VOICEVOX is running and accessible from this environment.");
                eprintln!("  Hint: try setting VOICEVOX_HOST=127.0.0.1 when running on the same machine as VOICEVOX.");
                eprintln!("  Details: {}", source);
            }
            RunError::Unhealthy(source) => eprintln!("  Details: {}", source),
            _ => {}
        }
    }

    fn from_probe(url: &str, source: VoicegenError) -> Self {
        if source.is_transport() {
            RunError::Unreachable {
                url: url.to_string(),
                source,
            }
        } else {
            RunError::Unhealthy(source)
        }
    }
}

pub fn run(cli: &Cli, settings: &Settings) -> Result<(), RunError> {
    let mut settings = settings.clone();
    if let Some(speaker) = cli.speaker {
        settings.speaker = speaker;
    }

    // Resolved once here and passed down; nothing below looks it up again.
    let lookup = SystemLookup::new(settings.lookup_timeout());
    let gateway = RouteTableGateway::new(&settings.route_table);
    let resolver = EndpointResolver::new(&lookup, &gateway);
    let resolve = |args: &EndpointArgs| {
        let endpoint = resolver.resolve(&settings, args.url.as_deref());
        info!(url = %endpoint.url, source = %endpoint.source, "resolved VOICEVOX endpoint");
        endpoint
    };

    match &cli.command {
        Commands::Resolve(args) => {
            let endpoint = resolve(args);
            println!("{}  ({})", endpoint.url, endpoint.source);
            Ok(())
        }
        Commands::Speakers(args) => list_speakers(&resolve(args), &settings),
        Commands::Calls(args) => generate(TableKind::Calls, args, &settings, &resolve(&args.endpoint)),
        Commands::Quotes(args) => generate(TableKind::Quotes, args, &settings, &resolve(&args.endpoint)),
        Commands::Retakes(args) => generate(TableKind::Retakes, args, &settings, &resolve(&args.endpoint)),
    }
}

fn generate(
    kind: TableKind,
    args: &GenerateArgs,
    settings: &Settings,
    endpoint: &Endpoint,
) -> Result<(), RunError> {
    generate_table(&Table::load(kind), args, settings, endpoint).map(|_| ())
}

fn list_speakers(endpoint: &Endpoint, settings: &Settings) -> Result<(), RunError> {
    let client = VoicevoxClient::new(&endpoint.url, settings.speaker, settings.timeouts())
        .map_err(RunError::Setup)?;
    let speakers = client
        .speakers()
        .map_err(|e| RunError::from_probe(&endpoint.url, e))?;

    for speaker in speakers {
        println!("{}", speaker.name);
        for style in speaker.styles {
            println!("  {:>4}  {}", style.id, style.name);
        }
    }
    Ok(())
}

fn health_check(client: &VoicevoxClient, health: HealthCheck) -> Result<(), RunError> {
    match health {
        HealthCheck::Required => client
            .check_speakers()
            .map_err(|e| RunError::from_probe(client.base_url(), e)),
        HealthCheck::Advisory => {
            match client.version() {
                Ok(version) => println!("VOICEVOX version: {}", version),
                Err(e) => eprintln!("WARN: version check failed: {}", e),
            }
            Ok(())
        }
        HealthCheck::Skip => Ok(()),
    }
}

/// Health check, then one file per line of `table`, then the manifest if the
/// table keeps one.
pub fn generate_table(
    table: &Table,
    args: &GenerateArgs,
    settings: &Settings,
    endpoint: &Endpoint,
) -> Result<BatchSummary, RunError> {
    let out_dir = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(table.default_out));
    std::fs::create_dir_all(&out_dir)
        .map_err(|e| RunError::Setup(VoicegenError::io(&out_dir, e)))?;

    let client = VoicevoxClient::new(&endpoint.url, settings.speaker, settings.timeouts())
        .map_err(RunError::Setup)?;

    eprintln!(
        "NOTE: If the connection is refused, allow connections from other computers in the \
         VOICEVOX settings, or run this tool on the machine where VOICEVOX runs."
    );
    println!("VOICEVOX: {} / speaker={}", client.base_url(), client.speaker());
    let shown = out_dir.canonicalize().unwrap_or_else(|_| out_dir.clone());
    println!("Output:  {}", shown.display());

    health_check(&client, table.health)?;
    info!(table = ?table.kind, lines = table.requests.len(), "starting batch");

    let options = BatchOptions {
        out_dir: out_dir.clone(),
        keep_going: args.keep_going,
        pause: args
            .pause_ms
            .map(Duration::from_millis)
            .unwrap_or(table.pause),
    };
    let summary = BatchRunner::new(&client, options).run(&table.requests)?;

    if table.write_manifest {
        summary
            .manifest
            .write(&out_dir.join(MANIFEST_FILE))
            .map_err(RunError::Setup)?;
    }

    println!("Done. Generated {} files.", summary.generated.len());
    if !summary.is_complete() {
        return Err(RunError::Incomplete {
            failed: summary.failures.len(),
            total: table.requests.len(),
        });
    }
    Ok(summary)
}
