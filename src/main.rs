use clap::{Parser, Subcommand};
use sq_filter::cli::{self, CliError};
use std::io::{self, Read};

#[derive(Parser)]
#[command(name = "sqf")]
#[command(about = "sqf - match JSON records against flexible filter conditions and render SQL-style WHERE clauses")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter JSON records through a condition
    Match {
        /// The filter condition as JSON
        condition: String,

        /// JSON record or array of records (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Render a condition as a WHERE expression
    Sql {
        /// The filter condition as JSON
        condition: String,

        /// Embed literals inline instead of emitting placeholders
        #[arg(long)]
        inline: bool,
    },

    /// Print the normalized canonical form of a condition
    Parse {
        /// The filter condition as JSON
        condition: String,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Match {
            condition,
            input,
            pretty,
        } => run_match(condition, input, pretty),
        Commands::Sql { condition, inline } => run_sql(condition, inline),
        Commands::Parse { condition, pretty } => run_parse(condition, pretty),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_input(input: Option<String>) -> Result<String, CliError> {
    match input {
        Some(s) => Ok(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Io)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

fn run_match(condition: String, input: Option<String>, pretty: bool) -> Result<(), CliError> {
    let input = read_input(input)?;
    let output = cli::execute_match(&condition, &input)?;
    print_json(&output, pretty)
}

fn run_sql(condition: String, inline: bool) -> Result<(), CliError> {
    let sql = cli::execute_sql(&condition, inline)?;
    println!("{}", sql.text);
    if !inline {
        print_json(&serde_json::Value::Array(sql.values), false)?;
    }
    Ok(())
}

fn run_parse(condition: String, pretty: bool) -> Result<(), CliError> {
    let output = cli::execute_parse(&condition)?;
    print_json(&output, pretty)
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    println!("{}", json);
    Ok(())
}
