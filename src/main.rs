//! labelkit-inspect: print the objects stored in Pascal VOC annotation files.
//!
//! Image paths are mapped to the annotation file next to them.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use labelkit::config::AppConfig;
use labelkit::format::{FormatError, voc};

/// Print the objects stored in Pascal VOC annotation files.
#[derive(Parser, Debug)]
#[command(name = "labelkit-inspect", version)]
struct Args {
    /// Config file to use instead of the per-user default.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Annotation files, or images whose annotation file sits next to them.
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn load_config(path: Option<&Path>) -> AppConfig {
    let loaded = match path {
        Some(path) => match AppConfig::load_from_path(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Ignoring config {}: {}", path.display(), e);
                None
            }
        },
        None => AppConfig::load_from_default_path(),
    };
    loaded.unwrap_or_default()
}

fn init_logging(config: &AppConfig) {
    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();
}

fn inspect(path: &Path) -> Result<(), FormatError> {
    let xml_path = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xml")) {
        path.to_path_buf()
    } else {
        voc::annotation_path_for(path)
    };
    let annotation = voc::read_annotation_file(&xml_path)?;

    println!(
        "{} ({}x{}, image {})",
        xml_path.display(),
        annotation.width(),
        annotation.height(),
        annotation.file().display()
    );
    for (index, object) in annotation.objects().iter().enumerate() {
        let b = object.bound_box();
        let kind = match object.polygon() {
            Some(vertices) => format!("polygon[{}]", vertices.len()),
            None => "box".to_string(),
        };
        println!(
            "  {:>3} {:<20} {:<12} ({:.0}, {:.0})-({:.0}, {:.0}) area {:.1}{}{}",
            index,
            object.name,
            kind,
            b.xmin,
            b.ymin,
            b.xmax,
            b.ymax,
            object.area(),
            if object.difficult { " difficult" } else { "" },
            if object.truncated { " truncated" } else { "" },
        );
    }
    println!(
        "  {} objects, total area {:.1}",
        annotation.objects().len(),
        annotation.total_area()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = load_config(args.config.as_deref());
    init_logging(&config);

    let mut failed = false;
    for file in &args.files {
        if let Err(e) = inspect(file) {
            log::error!("{}: {}", file.display(), e);
            failed = true;
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
