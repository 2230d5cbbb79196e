//! `kyc` - CLI for kyc-intake
//!
//! This binary fills the intake form from image files and camera captures
//! and submits it to the configured upload endpoint.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use kyc_intake::capture::platform::{list_cameras, platform_name, streaming_supported};
use kyc_intake::capture::{CaptureStatus, Preview};
use kyc_intake::cli::{Cli, Command, ConfigCommand, DevicesCommand, SubmitCommand};
use kyc_intake::{
    init_logging, CameraDevice, CaptureOptions, CaptureWidget, Config, FacingMode,
    FormController, HttpTransport, ImageArtifact, SystemCamera,
};

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Submit(submit_cmd) => handle_submit(&config, &submit_cmd).await,
        Command::Devices(devices_cmd) => handle_devices(&config, &devices_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_submit(
    config: &Config,
    cmd: &SubmitCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let endpoint = cmd
        .endpoint
        .clone()
        .unwrap_or_else(|| config.upload.endpoint.clone());
    let transport = HttpTransport::new(&endpoint, config.upload_timeout())?;

    let mut form = FormController::new(transport);
    form.set_name(cmd.name.clone());

    for (field, path) in cmd.files() {
        form.attach_file(field, &path).await?;
    }

    let mut options = CaptureOptions::from(&config.camera);
    if let Some(facing) = cmd.facing {
        options.facing = facing.into();
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    for field in cmd.camera_fields() {
        let existing = form.state().image(field).cloned();
        let mut widget =
            form.capture_widget(field, SystemCamera::from_config(&config.camera), options);

        eprintln!("--- {} ---", field.label());
        let confirmed = if cmd.yes {
            auto_capture(&mut widget, existing.as_ref()).await?;
            true
        } else {
            prompt_capture(&mut widget, existing.as_ref(), &mut input).await?
        };
        if !confirmed {
            eprintln!("Capture cancelled for {}", field.label());
        }
        form.apply_captures();
    }

    let receipt = form.submit().await?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        println!("Submitted to {} (HTTP {})", receipt.endpoint, receipt.status);
        for part in &receipt.parts {
            match &part.file_name {
                Some(file_name) => println!(
                    "  {:<18} {} ({} bytes)",
                    part.name, file_name, part.size
                ),
                None => println!("  {:<18} {} bytes of text", part.name, part.size),
            }
        }
    }
    Ok(())
}

async fn auto_capture<D: CameraDevice>(
    widget: &mut CaptureWidget<D>,
    existing: Option<&ImageArtifact>,
) -> kyc_intake::Result<()> {
    widget.open_camera(existing).await?;
    if widget.status() == CaptureStatus::Streaming {
        widget.capture()?;
    }
    widget.confirm().await
}

/// Drive one widget from stdin until the user confirms or cancels.
///
/// Returns whether a photo was confirmed.
async fn prompt_capture<D: CameraDevice>(
    widget: &mut CaptureWidget<D>,
    existing: Option<&ImageArtifact>,
    input: &mut Input,
) -> std::io::Result<bool> {
    if let Err(e) = widget.open_camera(existing).await {
        eprintln!("{e}");
    }

    loop {
        describe(widget);
        let prompt = match widget.status() {
            CaptureStatus::Streaming => "[c]apture, e[x]it",
            CaptureStatus::PreviewReady => "[u]se photo, [r]etake, e[x]it",
            _ => "[o]pen camera, e[x]it",
        };
        eprint!("{prompt} > ");

        let Some(line) = input.next_line().await? else {
            widget.cancel();
            return Ok(false);
        };

        let result = match line.trim() {
            "c" => widget.capture(),
            "u" => match widget.confirm().await {
                Ok(()) => return Ok(true),
                Err(e) => Err(e),
            },
            "r" => widget.retake().await,
            "o" => widget.open_camera(existing).await,
            "x" => {
                widget.cancel();
                return Ok(false);
            }
            other => {
                eprintln!("Unknown choice '{other}'");
                Ok(())
            }
        };

        if let Err(e) = result {
            eprintln!("{e}");
        }
    }
}

fn describe<D: CameraDevice>(widget: &CaptureWidget<D>) {
    match (widget.status(), widget.preview()) {
        (CaptureStatus::Streaming, _) => {
            if let Some((width, height)) = widget.stream_resolution() {
                eprintln!("Camera live at {width}x{height}");
            }
        }
        (_, Some(Preview::Still(still))) => {
            eprintln!("Preview: {}x{} still", still.width(), still.height());
        }
        (_, Some(Preview::Existing(artifact))) => {
            eprintln!(
                "Preview: current photo {} ({} bytes)",
                artifact.file_name(),
                artifact.len()
            );
        }
        _ => {}
    }
}

fn handle_devices(
    config: &Config,
    cmd: &DevicesCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let facing: FacingMode = cmd.facing.map_or(config.camera.facing, Into::into);
    let cameras = list_cameras(facing)?;

    if cmd.json {
        let devices = serde_json::json!({
            "platform": platform_name(),
            "streaming": streaming_supported(),
            "facing": facing,
            "devices": cameras,
        });
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else {
        println!("Cameras on {} (facing: {facing})", platform_name());
        println!("-----------");
        if !streaming_supported() {
            println!("Live capture is not available in this build; use image files.");
        }
        if cameras.is_empty() {
            println!("No cameras found.");
        }
        for camera in &cameras {
            let marker = if camera.selected { "*" } else { " " };
            println!("{marker} {:<14} {}", camera.path.display(), camera.name);
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Upload]");
                println!("  Endpoint:           {}", config.upload.endpoint);
                println!("  Timeout (secs):     {}", config.upload.timeout_secs);
                println!();
                println!("[Camera]");
                println!(
                    "  Device:             {}",
                    config
                        .camera
                        .device
                        .as_ref()
                        .map_or_else(|| "auto".to_string(), |d| d.display().to_string())
                );
                println!("  Facing:             {}", config.camera.facing);
                println!("  JPEG quality:       {}", config.camera.jpeg_quality);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
