use clap::{Args, Parser, Subcommand};
use cssvars_transform::{transform_sources, Options, Transformed, VariableMap};
use std::path::Path;

#[derive(Parser)]
#[command(name = "cssvars")]
#[command(about = "cssvars: resolve CSS custom properties to static values")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve var() references in one or more stylesheets
    Build {
        /// Input .css files, combined in order
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// JSON options file (keys as in the library's Options)
        #[arg(long)]
        config: Option<String>,

        /// Keep rules that do not involve custom properties
        #[arg(long)]
        all: bool,

        /// Replace values in place instead of adding resolved copies
        #[arg(long)]
        discard_originals: bool,

        #[command(flatten)]
        vars: VarArgs,

        /// Indented output
        #[arg(long)]
        pretty: bool,
    },

    /// Check stylesheets for syntax errors without transforming them
    Check {
        /// Input .css files
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Print the collected variables as JSON
    Vars {
        /// Input .css files, combined in order
        #[arg(required = true)]
        inputs: Vec<String>,

        #[command(flatten)]
        vars: VarArgs,
    },
}

#[derive(Args)]
struct VarArgs {
    /// Override a variable, e.g. --var color=red (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            inputs,
            output,
            config,
            all,
            discard_originals,
            vars,
            pretty,
        } => {
            let mut options = match config {
                Some(path) => load_config(&path),
                None => Options::default(),
            };
            if all {
                options.only_variables = false;
            }
            if discard_originals {
                options.preserve_originals = false;
            }
            if pretty {
                options.pretty = true;
            }
            options.override_variables.extend(vars.vars);
            cmd_build(&inputs, output.as_deref(), &options);
        }
        Command::Check { inputs } => cmd_check(&inputs),
        Command::Vars { inputs, vars } => {
            let options = Options {
                override_variables: vars.vars.into_iter().collect::<VariableMap>(),
                ..Options::default()
            };
            cmd_vars(&inputs, &options);
        }
    }
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.trim_start_matches('-').is_empty() {
        return Err(format!("missing variable name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn load_config(path: &str) -> Options {
    let raw = read_source(path);
    match serde_json::from_str(&raw) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error in config {path}: {e}");
            std::process::exit(1);
        }
    }
}

/// Transform all inputs as one stylesheet, exiting on failure.
fn run(inputs: &[String], options: &Options) -> Transformed {
    let sources: Vec<String> = inputs.iter().map(|path| read_source(path)).collect();
    let sources: Vec<&str> = sources.iter().map(String::as_str).collect();

    let mut warnings = 0usize;
    let result = transform_sources(&sources, options, |warning| {
        warnings += 1;
        log::warn!("{warning}");
    });

    match result {
        Ok(transformed) => {
            log::info!("{} warning(s)", warnings);
            transformed
        }
        Err(cssvars_transform::TransformError::Chunk { index, source, context }) => {
            eprintln!("Parse error in {}: {source} (near `{context}`)", inputs[index]);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Parse error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_build(inputs: &[String], output: Option<&str>, options: &Options) {
    let transformed = run(inputs, options);

    let Some(path) = output else {
        println!("{}", transformed.css);
        return;
    };

    let mut css = transformed.css;
    if !css.ends_with('\n') {
        css.push('\n');
    }
    if let Err(e) = std::fs::write(path, &css) {
        eprintln!("Error writing {path}: {e}");
        std::process::exit(1);
    }
    eprintln!("Built: {path}");
}

fn cmd_check(inputs: &[String]) {
    let mut failed = false;

    for path in inputs {
        let source = read_source(path);
        match cssvars_parser::Parser::parse(&source) {
            Ok(_) => eprintln!("OK: {path}"),
            Err(e) => {
                eprintln!("{path}: {e}");
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}

fn cmd_vars(inputs: &[String], options: &Options) {
    let transformed = run(inputs, options);

    match serde_json::to_string_pretty(&transformed.variables) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error encoding variables: {e}");
            std::process::exit(1);
        }
    }
}
