use clap::{Parser, Subcommand};
use medias_picker::bridge::{ChannelResponder, MethodCall};
use medias_picker::config::{self, PluginConfig};
use medias_picker::imaging::{RustBackend, compress_all};
use medias_picker::output;
use medias_picker::permission::StaticPermissions;
use medias_picker::picker::PresetPicker;
use medias_picker::plugin::MediaPickerPlugin;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "medias-picker")]
#[command(about = "Media picker plugin core: bounded image compression and temp artifacts")]
#[command(long_about = "\
Media picker plugin core: bounded image compression and temp artifacts

Images are shrunk to fit a bounding box (aspect ratio kept, EXIF orientation
applied) and written as new files in the artifact directory. Sources are never
modified. If an image cannot be compressed its original path is reported.

The `call` command drives the same method dispatch a host application uses,
with a preset picker selection and fixed permission answers:

  medias-picker call checkPermission --deny-camera
  medias-picker call compressImages \\
      --args '{\"maxWidth\":800,\"maxHeight\":800,\"quality\":70,\"imgPaths\":[\"a.jpg\"]}'
  medias-picker call pickImages --select a.jpg --select clip.mp4 \\
      --args '{\"withVideo\":true,\"maxWidth\":800,\"maxHeight\":800,\"quality\":70}'

Set RUST_LOG to override the log filter.
Run 'medias-picker gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress images to fit a bounding box
    Compress {
        #[arg(long)]
        max_width: u32,
        #[arg(long)]
        max_height: u32,
        /// JPEG quality, clamped to 1..=100
        #[arg(long, default_value_t = 70)]
        quality: u32,
        paths: Vec<String>,
    },
    /// Remove the artifact directory and everything in it
    ClearTemp,
    /// Dispatch one bridge method and print its reply
    Call {
        method: String,
        /// Arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
        /// Paths the preset picker offers, in order
        #[arg(long = "select")]
        select: Vec<String>,
        #[arg(long)]
        deny_camera: bool,
        #[arg(long)]
        deny_storage: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Compress {
            max_width,
            max_height,
            quality,
            paths,
        } => {
            let config = config::load_config(&cli.config)?;
            let results = compress_all(
                &RustBackend::new(),
                &config.work_dir(),
                &paths,
                (max_width, max_height),
                quality,
                &config.normalize_options(),
            );
            output::print_compress_output(&output::pair_outcomes(&paths, &results));
        }
        Command::ClearTemp => {
            let config = config::load_config(&cli.config)?;
            let work_dir = config.work_dir();
            output::print_clear_output(work_dir.path(), work_dir.clear());
        }
        Command::Call {
            method,
            args,
            select,
            deny_camera,
            deny_storage,
        } => {
            let config = config::load_config(&cli.config)?;
            let arguments = match args {
                Some(json) => serde_json::from_str(&json)?,
                None => serde_json::Value::Null,
            };
            run_call(
                &config,
                MethodCall::new(method, arguments),
                select,
                StaticPermissions::new(!deny_storage, !deny_camera),
            )?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Dispatch `call`, resolve any deferred reply from the presets, print it.
fn run_call(
    config: &PluginConfig,
    call: MethodCall,
    selection: Vec<String>,
    permissions: StaticPermissions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut plugin = MediaPickerPlugin::from_config(
        RustBackend::new(),
        PresetPicker::new(selection),
        permissions,
        config,
    );

    let (responder, rx) = ChannelResponder::new();
    if plugin.on_method_call(&call, Box::new(responder)).is_some() {
        let launched = plugin.picker().take_launched();
        for (id, request) in launched {
            let selected = plugin.picker().selection_for(&request);
            plugin.on_picker_result(id, Some(selected));
        }
        let requests = plugin.permissions().take_requests();
        for (id, capabilities) in requests {
            let grants = plugin.permissions().grants_for(&capabilities);
            plugin.on_permissions_result(id, &grants);
        }
    }

    let reply = rx.recv()?;
    output::print_reply(&call.method, &reply);
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "medias_picker=debug"
    } else {
        "medias_picker=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
