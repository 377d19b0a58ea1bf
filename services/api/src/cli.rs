use crate::demo::{run_demo, run_evaluate, run_score, DemoArgs, EvaluateArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use essay_coach::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "essay-coach-api",
    about = "Score NSW Selective writing practice essays from the command line or over HTTP",
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
    /// Print the realtime heuristic breakdown for an essay file
    Score(ScoreArgs),
    /// Run the full grammar + generative evaluation and print the JSON report
    Evaluate(EvaluateArgs),
    /// Replay a sample essay through a debounced realtime session
    Demo(DemoArgs),
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
        Command::Evaluate(args) => run_evaluate(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use essay_coach::essay::TextType;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["essay-coach-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn score_accepts_file_and_text_type() {
        let cli = Cli::try_parse_from([
            "essay-coach-api",
            "score",
            "--file",
            "essay.txt",
            "--text-type",
            "persuasive",
        ])
        .expect("parses");
        let Some(Command::Score(args)) = cli.command else {
            panic!("expected score command");
        };
        assert_eq!(args.text_type, TextType::Persuasive);
        assert_eq!(args.file.to_string_lossy(), "essay.txt");
    }

    #[test]
    fn unknown_text_types_are_rejected() {
        let result = Cli::try_parse_from([
            "essay-coach-api",
            "evaluate",
            "--file",
            "essay.txt",
            "--text-type",
            "limerick",
        ]);
        assert!(result.is_err());
    }
}
