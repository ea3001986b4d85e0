use clap::{Parser as ClapParser, Subcommand};
use seqwire::{
    OutputFormat,
    cli::{self, CliError, FoldOptions, SerializeOptions},
};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "seqwire")]
#[command(about = "seqwire - Compile query expression trees into remote query options")]
#[command(version)]
struct Cli {
    /// Log pipeline steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serialize a JSON-encoded query into query options
    Serialize {
        /// JSON expression tree (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Parts)]
        format: OutputFormat,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Normalize and fold constants, printing the resulting tree
    Fold {
        /// JSON expression tree (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Serialize {
            input,
            format,
            pretty,
        } => read_input(input).and_then(|input| {
            cli::execute_serialize(&SerializeOptions {
                input,
                format,
                pretty,
            })
        }),
        Commands::Fold { input, pretty } => {
            read_input(input).and_then(|input| cli::execute_fold(&FoldOptions { input, pretty }))
        }
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("seqwire=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    Ok(match input {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    })
}
