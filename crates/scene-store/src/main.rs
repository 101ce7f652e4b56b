use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use klorad_scene_store::command::execute_json_batch;
use klorad_scene_store::state::{SceneStore, StoreSettings};

#[derive(Default)]
struct Args {
    scene: Option<PathBuf>,
    commands: Option<PathBuf>,
    out: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "klorad_scene=info".into()),
        )
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("usage: klorad-scene [--scene <file>] [--commands <file>] [--out <file>]");
            return ExitCode::from(2);
        }
    };

    let settings = StoreSettings::load();
    let autosave = settings.autosave;
    let mut store = SceneStore::with_settings(settings);

    if let Some(path) = &args.scene {
        match SceneStore::read_document(path) {
            Ok(doc) => store.load_document(doc),
            Err(e) => {
                tracing::error!("Failed to load scene from {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    let script = match read_commands(args.commands.as_deref()) {
        Ok(script) => script,
        Err(e) => {
            tracing::error!("Failed to read commands: {e}");
            return ExitCode::FAILURE;
        }
    };

    if !script.trim().is_empty() {
        let responses = match execute_json_batch(&mut store, &script) {
            Ok(responses) => responses,
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::FAILURE;
            }
        };
        let failed = responses.iter().filter(|r| !r.success).count();
        match serde_json::to_string_pretty(&responses) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!("Cannot serialize responses: {e}");
                return ExitCode::FAILURE;
            }
        }
        if failed > 0 {
            tracing::warn!("{failed} of {} commands failed", responses.len());
        }
    }

    if let Some(path) = &args.out {
        if let Err(e) = store.save_to(path) {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
        tracing::info!("Wrote scene to {}", path.display());
    }
    if autosave {
        store.autosave();
    }

    ExitCode::SUCCESS
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let slot = match flag.as_str() {
            "--scene" => &mut args.scene,
            "--commands" => &mut args.commands,
            "--out" => &mut args.out,
            other => return Err(format!("Unknown argument `{other}`")),
        };
        let value = it
            .next()
            .ok_or_else(|| format!("Missing value for {flag}"))?;
        *slot = Some(PathBuf::from(value));
    }
    Ok(args)
}

/// Command batch from a file, or stdin when no file is given
fn read_commands(path: Option<&std::path::Path>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
