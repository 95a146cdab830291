use std::env;
use std::fs;
use std::path::PathBuf;

use formats::{
    ShapefileComponentSet, UploadedArchive, decode, decode_shp_only, resolve_prj_hint,
};
use runtime::Severity;
use scene::{MapConfig, MapModel};
use tracing_subscriber::EnvFilter;
use viewer::{UploadController, UploadResponse};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "inspect" => cmd_inspect(args),
        "load" => cmd_load(args),
        "export" => cmd_export(args),
        _ => Err(usage()),
    }
}

fn cmd_inspect(args: Vec<String>) -> Result<(), String> {
    // shapeatlas inspect <upload.zip>
    if args.len() != 1 {
        return Err(usage());
    }

    let path = PathBuf::from(&args[0]);
    let bytes = fs::read(&path).map_err(|e| format!("read {path:?}: {e}"))?;
    let archive =
        UploadedArchive::from_zip_bytes(&bytes).map_err(|e| format!("open archive: {e}"))?;

    println!("content hash: {}", archive.content_hash());
    for member in archive.members() {
        println!("  {} ({} bytes)", member.name, member.bytes.len());
    }

    let set = ShapefileComponentSet::classify(&archive);
    match set.validate() {
        Ok(()) => {
            let prj_text = set.prj_name().and_then(|name| archive.member_text(name));
            let projection = resolve_prj_hint(prj_text.as_deref());
            println!("shapefile: {}", set.shp_name().unwrap_or("?"));
            println!("projection: {projection}");
        }
        Err(e) => println!("invalid upload: {e}"),
    }
    Ok(())
}

fn cmd_load(args: Vec<String>) -> Result<(), String> {
    // shapeatlas load <file.zip|file.shp> [--config map.json]
    if args.is_empty() {
        return Err(usage());
    }

    let path = PathBuf::from(&args[0]);
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("--config requires a value".to_string());
                }
                config_path = Some(PathBuf::from(&args[i]));
            }
            s => {
                return Err(format!("unknown arg: {s}\n\n{}", usage()));
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(p) => MapConfig::load(&p).map_err(|e| format!("load config {p:?}: {e}"))?,
        None => MapConfig::default(),
    };

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("invalid file name: {path:?}"))?
        .to_string();
    let bytes = fs::read(&path).map_err(|e| format!("read {path:?}: {e}"))?;

    let mut map = MapModel::new(&config);
    let mut controller = UploadController::new(config);
    let response = controller.handle_upload(&file_name, &bytes, &mut map);

    for event in controller.drain_events() {
        match event.severity {
            Severity::Status => println!("status: {}", event.message),
            Severity::Error => println!("error: {}", event.message),
        }
    }

    match response {
        UploadResponse::Completed(summary) => {
            println!(
                "loaded {} features ({}), layer {:?}",
                summary.feature_count, summary.projection, summary.layer_id
            );
            let view = map.view();
            println!(
                "camera: center [{:.1}, {:.1}] zoom {:.2}",
                view.center()[0],
                view.center()[1],
                view.zoom()
            );
            Ok(())
        }
        UploadResponse::Failed(err) => Err(format!("upload failed: {err}")),
        UploadResponse::Busy => Err("upload already in progress".to_string()),
    }
}

fn cmd_export(args: Vec<String>) -> Result<(), String> {
    // shapeatlas export <file.zip|file.shp> <out.geojson>
    if args.len() != 2 {
        return Err(usage());
    }

    let path = PathBuf::from(&args[0]);
    let out_path = PathBuf::from(&args[1]);
    let bytes = fs::read(&path).map_err(|e| format!("read {path:?}: {e}"))?;

    let is_zip = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

    let mut collection = if is_zip {
        let archive =
            UploadedArchive::from_zip_bytes(&bytes).map_err(|e| format!("open archive: {e}"))?;
        let set = ShapefileComponentSet::classify(&archive);
        set.validate().map_err(|e| format!("invalid upload: {e}"))?;
        let shp = set
            .shp_name()
            .and_then(|name| archive.member_bytes(name))
            .ok_or_else(|| "missing .shp member".to_string())?;
        let dbf = set
            .dbf_name()
            .and_then(|name| archive.member_bytes(name))
            .ok_or_else(|| "missing .dbf member".to_string())?;
        let prj_text = set.prj_name().and_then(|name| archive.member_text(name));

        let mut collection = decode(shp, dbf).map_err(|e| format!("decode: {e}"))?;
        collection.crs_name = Some(resolve_prj_hint(prj_text.as_deref()).to_string());
        collection
    } else {
        decode_shp_only(&bytes).map_err(|e| format!("decode: {e}"))?
    };

    if collection.crs_name.is_none() {
        collection.crs_name = Some(formats::DEFAULT_PROJECTION.to_string());
    }

    let payload = collection
        .to_geojson_string_pretty()
        .map_err(|e| format!("json: {e}"))?;
    fs::write(&out_path, payload).map_err(|e| format!("write {out_path:?}: {e}"))?;
    println!(
        "wrote {} features to {}",
        collection.features.len(),
        out_path.display()
    );
    Ok(())
}

fn usage() -> String {
    [
        "usage:",
        "  shapeatlas inspect <upload.zip>",
        "  shapeatlas load <file.zip|file.shp> [--config map.json]",
        "  shapeatlas export <file.zip|file.shp> <out.geojson>",
    ]
    .join("\n")
}
