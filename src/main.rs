use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use head_loss_explorer::config::{self, Config, Preset};
use head_loss_explorer::dashboard::build_chart;
use head_loss_explorer::head_loss::FlowParameters;
use head_loss_explorer::i18n::{self, Translator};
use head_loss_explorer::{app, ui_cli};

#[derive(Parser)]
#[command(name = "head_loss_explorer_cli")]
#[command(about = "Darcy-Weisbach head loss explorer (terminal)", long_about = None)]
struct Cli {
    /// Settings file, created with defaults when missing (default: config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Language: auto, en-us, de-de, ko-kr
    #[arg(long, short = 'L', default_value = "auto")]
    lang: String,
    /// Dashboard preset (standard, wide-diameter); overrides the settings file
    #[arg(long)]
    preset: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate head loss at one operating point
    Point(PointArgs),
    /// Print reference and current curves as a table
    Curve {
        #[command(flatten)]
        point: PointArgs,
        /// Print every n-th sample
        #[arg(long, default_value_t = 20)]
        stride: usize,
    },
    /// Menu-driven session (default)
    Interactive,
}

#[derive(Args)]
struct PointArgs {
    /// Friction coefficient λ [-]
    #[arg(long)]
    friction: Option<f64>,
    /// Pipe length L [m]
    #[arg(long)]
    length: Option<f64>,
    /// Pipe diameter D [m]
    #[arg(long)]
    diameter: Option<f64>,
    /// Operating-point flow rate Q [m³/s]
    #[arg(long)]
    flow: Option<f64>,
    /// Reject values outside the preset's slider ranges
    #[arg(long)]
    strict_ranges: bool,
}

impl PointArgs {
    fn parameters(&self, defaults: FlowParameters) -> FlowParameters {
        FlowParameters::new(
            self.friction.unwrap_or(defaults.friction_coefficient),
            self.length.unwrap_or(defaults.pipe_length_m),
            self.diameter.unwrap_or(defaults.pipe_diameter_m),
            self.flow.unwrap_or(defaults.flow_rate_m3_per_s),
        )
    }
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 CLI 애플리케이션을 실행한다.
fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    if let Err(err) = try_run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_run(cli: Cli) -> Result<(), app::AppError> {
    let mut cfg: Config = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load_or_default()?,
    };
    if let Some(code) = cli.preset.as_deref() {
        match Preset::from_code(code) {
            Some(preset) => {
                cfg.preset = preset;
                cfg.dashboard = None;
            }
            None => tracing::warn!(preset = code, "unknown preset, keeping configured one"),
        }
    }
    let lang = i18n::resolve_language(&cli.lang, Some(cfg.language.as_str()));
    tracing::debug!(lang = %lang, "language resolved");
    let mut tr = Translator::new_with_pack(&lang, cfg.language_pack_dir.as_deref());
    let dashboard = cfg.dashboard();

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Point(args) => {
            let params = ui_cli::checked_parameters(
                &dashboard,
                args.parameters(dashboard.default_parameters()),
                args.strict_ranges,
            )?;
            let chart = build_chart(&dashboard, &params)?;
            print!("{}", ui_cli::render_point(&tr, &chart, &params));
        }
        Commands::Curve { point, stride } => {
            let params = ui_cli::checked_parameters(
                &dashboard,
                point.parameters(dashboard.default_parameters()),
                point.strict_ranges,
            )?;
            let chart = build_chart(&dashboard, &params)?;
            print!("{}", ui_cli::render_chart(&tr, &chart, &params, stride));
        }
        Commands::Interactive => app::run(&mut cfg, &mut tr)?,
    }
    Ok(())
}
