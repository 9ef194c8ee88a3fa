use crate::commands::{run_config_defaults, run_score, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lead_ranker::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Lead Ranker",
    about = "Score, rank and explain sales leads from CSV exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a lead CSV and print or export the ranked results
    Score(ScoreArgs),
    /// Inspect scoring configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the default scoring configuration as JSON
    Defaults,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Config {
            command: ConfigCommand::Defaults,
        } => run_config_defaults(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["lead-ranker-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn score_arguments_parse() {
        let cli = Cli::try_parse_from([
            "lead-ranker-api",
            "score",
            "--input",
            "leads.csv",
            "--min-score",
            "60",
            "--industry",
            "saas",
            "--top",
            "5",
            "--json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Score(args)) => {
                assert_eq!(args.input.to_string_lossy(), "leads.csv");
                assert_eq!(args.min_score, Some(60.0));
                assert_eq!(args.industry.as_deref(), Some("saas"));
                assert_eq!(args.top, Some(5));
                assert!(args.json);
                assert!(args.output.is_none());
                assert!(!args.filtered_output);
            }
            other => panic!("expected score command, got {other:?}"),
        }
    }

    #[test]
    fn filtered_output_requires_an_output_path() {
        let result = Cli::try_parse_from([
            "lead-ranker-api",
            "score",
            "--input",
            "leads.csv",
            "--filtered-output",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "lead-ranker-api",
            "score",
            "--input",
            "leads.csv",
            "--output",
            "ranked.csv",
            "--filtered-output",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Score(args)) => assert!(args.filtered_output),
            other => panic!("expected score command, got {other:?}"),
        }
    }

    #[test]
    fn min_score_outside_range_is_rejected() {
        let result = Cli::try_parse_from([
            "lead-ranker-api",
            "score",
            "--input",
            "leads.csv",
            "--min-score",
            "140",
        ]);
        assert!(result.is_err());
    }
}
