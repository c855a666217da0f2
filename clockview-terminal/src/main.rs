/// clockview terminal - rotating 3D clock
///
/// Controls:
///   - Tab / 1-5: select a control
///   - Left/Right, PageUp/PageDown: adjust it
///   - WASD: orbit the camera, +/-: zoom
///   - Q/ESC: quit
use anyhow::Context;
use clap::Parser;
use clockview_terminal::cli::Args;
use clockview_terminal::logging::init_logging;
use clockview_terminal::{AssetLoader, TerminalApp};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.logging_config())
        .with_context(|| format!("opening log file {}", args.log_file.display()))?;

    let config = args.viewer_config().context("invalid initial control value")?;
    log::info!("starting clockview with {:?}", config.controls);

    // A failed load is logged by the viewer; the app keeps running without it
    let loader = AssetLoader::spawn(args.asset.clone()).context("starting asset loader")?;

    let mut app = TerminalApp::new(&config, loader, args.frame_time())
        .context("querying terminal size")?;
    app.run().context("running terminal renderer")?;

    log::info!("clockview exited");
    Ok(())
}
