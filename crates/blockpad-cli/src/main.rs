mod script;

use anyhow::{Context, Result, bail};
use blockpad_config::Config;
use blockpad_engine::{Block, EditorController};
use std::io::Read;
use std::path::PathBuf;
use std::{env, fs, io, process};

use script::{Session, parse_script};

struct Args {
    document: Option<PathBuf>,
    script: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        document: None,
        script: None,
        json: false,
    };
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => args.json = true,
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ if args.document.is_none() => args.document = Some(PathBuf::from(arg)),
            _ if args.script.is_none() => args.script = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument {arg}"),
        }
    }
    Ok(args)
}

fn print_usage() {
    eprintln!("Usage: blockpad-cli [--json] [document.json] [script]");
    eprintln!();
    eprintln!("Runs editing commands against a JSON block document and prints the result.");
    eprintln!("The document defaults to `document_path` from the config file; commands");
    eprintln!("are read from stdin when no script is given.");
}

fn load_blocks(path: &PathBuf) -> Result<Vec<Block>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse document {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let config = Config::load_or_default()?;

    let Some(document) = args.document.or(config.document_path.clone()) else {
        print_usage();
        eprintln!();
        eprintln!("No document given and no document_path in {}", Config::config_path().display());
        process::exit(1);
    };
    let blocks = load_blocks(&document)?;
    log::info!("Loaded {} blocks from {}", blocks.len(), document.display());

    let source = match &args.script {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            source
        }
    };
    let commands = parse_script(&source)?;

    let controller = EditorController::builder(blocks)
        .settings(config.editor)
        .build();
    let mut session = Session::new(controller);
    session.run_all(&commands);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(session.controller.blocks())?
        );
    } else {
        println!("{}", session.controller.plain_text());
    }
    session.controller.destroy();
    Ok(())
}
