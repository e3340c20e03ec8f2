//! Command-line front end.
//!
//! ```text
//! pdfsift [-v] [-debug] [-text] [-o FILE] [-stats] [-json] [-csv] [-r]
//!         [-find PATTERN] PATH...
//! ```
//!
//! Inputs are PDF files, or directories when `-r` is given (walked
//! recursively for `*.pdf`). Exit code 0 on success, 1 on usage error
//! or when no inputs matched.

use pdf_sift::{MetricsCollection, PdfDocument, parse_from_path};
use std::io::Write;
use std::path::{Path, PathBuf};

struct Config {
    verbose: bool,
    debug: bool,
    text: bool,
    stats: bool,
    json: bool,
    csv: bool,
    recursive: bool,
    find: Option<String>,
    output: Option<PathBuf>,
    paths: Vec<PathBuf>,
}

impl Config {
    fn from_args(args: &[String]) -> Result<Self, String> {
        let mut config = Config {
            verbose: false,
            debug: false,
            text: false,
            stats: false,
            json: false,
            csv: false,
            recursive: false,
            find: None,
            output: None,
            paths: Vec::new(),
        };

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "-v" => config.verbose = true,
                "-debug" => config.debug = true,
                "-text" => config.text = true,
                "-stats" => config.stats = true,
                "-json" => config.json = true,
                "-csv" => config.csv = true,
                "-r" => config.recursive = true,
                "-find" => {
                    i += 1;
                    match args.get(i) {
                        Some(pattern) => config.find = Some(pattern.clone()),
                        None => return Err("-find requires a pattern".to_string()),
                    }
                },
                "-o" => {
                    i += 1;
                    match args.get(i) {
                        Some(path) => config.output = Some(PathBuf::from(path)),
                        None => return Err("-o requires a file path".to_string()),
                    }
                },
                flag if flag.starts_with('-') => {
                    return Err(format!("unknown flag: {}", flag));
                },
                path => config.paths.push(PathBuf::from(path)),
            }
            i += 1;
        }

        if config.paths.is_empty() {
            return Err("no input paths given".to_string());
        }
        Ok(config)
    }
}

fn usage() {
    eprintln!(
        "Usage: pdfsift [-v] [-debug] [-text] [-o FILE] [-stats] [-json] [-csv] [-r] \
         [-find PATTERN] PATH..."
    );
    eprintln!();
    eprintln!("  -v        verbose logging (info level)");
    eprintln!("  -debug    debug logging");
    eprintln!("  -text     print extracted text");
    eprintln!("  -o FILE   write output to FILE instead of stdout");
    eprintln!("  -stats    print statistics (human-readable)");
    eprintln!("  -json     print statistics as JSON");
    eprintln!("  -csv      print statistics as CSV");
    eprintln!("  -r        recurse into directories collecting *.pdf");
    eprintln!("  -find P   print regex matches over the document text");
}

fn collect_inputs(paths: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            if recursive {
                walk_dir(path, &mut inputs);
            } else {
                eprintln!("{}: is a directory (use -r to recurse)", path.display());
            }
        } else {
            inputs.push(path.clone());
        }
    }
    inputs.sort();
    inputs
}

fn walk_dir(dir: &Path, inputs: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("{}: {}", dir.display(), e);
            return;
        },
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk_dir(&path, inputs);
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        {
            inputs.push(path);
        }
    }
}

fn summarize(doc: &PdfDocument) -> String {
    format!(
        "{}\n  version: {}\n  objects: {}\n  pages: {}\n  fonts: {}\n  text chunks: {}\n",
        doc.name(),
        doc.version(),
        doc.object_count(),
        doc.page_count(),
        doc.font_count(),
        doc.text_chunks().len()
    )
}

fn run(config: &Config) -> i32 {
    let inputs = collect_inputs(&config.paths, config.recursive);
    if inputs.is_empty() {
        eprintln!("no matching inputs");
        return 1;
    }

    let mut out = String::new();
    let mut collection = MetricsCollection::new();
    let mut failures = 0;

    for path in &inputs {
        let doc = match parse_from_path(path) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                failures += 1;
                continue;
            },
        };

        if config.text {
            out.push_str(doc.full_text());
            out.push('\n');
        } else if !config.stats && !config.json && !config.csv && config.find.is_none() {
            out.push_str(&summarize(&doc));
        }

        if let Some(pattern) = &config.find {
            match doc.search(pattern) {
                Ok(matches) => {
                    for m in matches {
                        out.push_str(&format!("{}: {}\n", doc.name(), m));
                    }
                },
                Err(e) => {
                    eprintln!("{}", e);
                    return 1;
                },
            }
        }

        if config.stats {
            out.push_str(&doc.metrics().to_string());
        }
        if config.json {
            out.push_str(&doc.metrics().to_json());
            out.push('\n');
        }
        if config.csv {
            collection.add(doc.metrics().clone());
        }
    }

    if config.csv && !collection.is_empty() {
        out.push_str(&collection.export_csv());
    }

    match &config.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &out) {
                eprintln!("{}: {}", path.display(), e);
                return 1;
            }
        },
        None => {
            print!("{}", out);
            let _ = std::io::stdout().flush();
        },
    }

    if failures == inputs.len() {
        return 1;
    }
    0
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            usage();
            std::process::exit(1);
        },
    };

    let level = if config.debug {
        log::LevelFilter::Debug
    } else if config.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new().filter_level(level).init();

    std::process::exit(run(&config));
}
