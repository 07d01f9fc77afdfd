use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use hydrosite_cli::commands::optimal::{handle_optimal, CapPolicyArg, LinePolicyArg, OptimalArgs};
use hydrosite_cli::output::OutputFormat;
use hydrosite_lib::{Error as LibError, WORKSPACE_ENV};

/// Exit code when no workspace is available.
const EXIT_NO_WORKSPACE: u8 = 1;
/// Exit code for every other fatal error.
const EXIT_FAILURE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find the optimal positions of run-of-river hydropower plants along a river network"
)]
struct Cli {
    /// Workspace directory holding the raster/ and vector/ layers.
    #[arg(long, env = WORKSPACE_ENV)]
    workspace: Option<PathBuf>,

    /// Discharge raster [m3/s].
    #[arg(long)]
    discharge: String,

    /// River network vector.
    #[arg(long)]
    river: String,

    /// Elevation raster [m].
    #[arg(long)]
    elevation: String,

    /// Output point layer with the intake and restitution of every plant.
    #[arg(long = "output-point")]
    output_point: String,

    /// Output line layer with the river stretch of every plant.
    #[arg(long = "output-plant")]
    output_plant: Option<String>,

    /// Maximum plant length [m].
    #[arg(long = "len-plant", default_value_t = 10_000.0)]
    len_plant: f64,

    /// Minimum plant length [m].
    #[arg(long = "len-min", default_value_t = 10.0)]
    len_min: f64,

    /// Minimum distance between two plants [m].
    #[arg(long, default_value_t = 0.5)]
    distance: f64,

    /// Plant efficiency.
    #[arg(long, default_value_t = 1.0)]
    efficiency: f64,

    /// Maximum plant power [kW].
    #[arg(long = "p-max")]
    p_max: Option<f64>,

    /// Handling of candidates above --p-max.
    #[arg(long = "p-max-policy", value_enum, default_value_t = CapPolicyArg::Clamp)]
    p_max_policy: CapPolicyArg,

    /// Handling of river lines that cannot be processed.
    #[arg(long = "on-invalid-line", value_enum, default_value_t = LinePolicyArg::Skip)]
    on_invalid_line: LinePolicyArg,

    /// Also write every sampled station to <output-point>_stations.
    #[arg(short, long)]
    debug: bool,

    /// Dissolve touching river lines of the same category first.
    #[arg(short, long)]
    clean: bool,

    /// Allow existing output and temporary layers to be replaced.
    #[arg(long)]
    overwrite: bool,

    /// Summary format printed to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl Cli {
    fn into_args(self) -> (OptimalArgs, OutputFormat) {
        let args = OptimalArgs {
            workspace: self.workspace,
            discharge: self.discharge,
            river: self.river,
            elevation: self.elevation,
            output_point: self.output_point,
            output_plant: self.output_plant,
            len_plant: self.len_plant,
            len_min: self.len_min,
            distance: self.distance,
            efficiency: self.efficiency,
            p_max: self.p_max,
            p_max_policy: self.p_max_policy,
            on_invalid_line: self.on_invalid_line,
            debug: self.debug,
            clean: self.clean,
            overwrite: self.overwrite,
        };
        (args, self.format)
    }
}

fn main() -> ExitCode {
    init_tracing();
    let (args, format) = Cli::parse().into_args();

    match handle_optimal(&args, format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(&err),
    }
}

fn report_failure(err: &anyhow::Error) -> ExitCode {
    let session_error = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<LibError>())
        .filter(|cause| matches!(cause, LibError::SessionUnavailable { .. }));

    if let Some(cause) = session_error {
        eprintln!("You must be in a hydrosite workspace to run this program ({cause})");
        return ExitCode::from(EXIT_NO_WORKSPACE);
    }

    eprintln!("Error: {err:#}");
    ExitCode::from(EXIT_FAILURE)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
