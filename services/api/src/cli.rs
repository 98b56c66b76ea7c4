use crate::server;
use crate::submit::{run_submit, SubmitArgs};
use clap::{Args, Parser, Subcommand};
use talent_sift::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Talent Sift",
    about = "Rank resumes against a job posting and route the shortlist downstream",
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
    /// Submit a posting and local resume files once, printing the outcome as JSON
    Submit(SubmitArgs),
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
        Command::Submit(args) => run_submit(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["talent-sift"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn submit_accepts_repeated_resumes() {
        let cli = Cli::try_parse_from([
            "talent-sift",
            "submit",
            "--title",
            "Backend Engineer",
            "--job-type",
            "full time",
            "--description",
            "Build services",
            "--resume",
            "a.pdf",
            "--resume",
            "b.pdf",
            "--destination",
            "automation",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Submit(args)) => {
                assert_eq!(args.resumes.len(), 2);
                assert_eq!(args.destination, "automation");
                assert_eq!(args.org_id, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn job_type_help_lists_accepted_values() {
        use clap::CommandFactory;
        use talent_sift::workflows::screening::JobType;

        let command = Cli::command();
        let submit = command
            .find_subcommand("submit")
            .expect("submit subcommand");
        let help = submit
            .get_arguments()
            .find(|arg| arg.get_id() == "job_type")
            .and_then(|arg| arg.get_help())
            .map(|help| help.to_string())
            .expect("job type help");

        for job_type in JobType::ALL {
            assert!(help.contains(job_type.label()), "{help} lacks {job_type}");
            assert_eq!(JobType::parse(job_type.label()), Some(job_type));
        }
        assert!(!help.contains("temporary"));
    }

    #[test]
    fn submit_requires_a_resume() {
        let result = Cli::try_parse_from([
            "talent-sift",
            "submit",
            "--title",
            "Backend Engineer",
            "--job-type",
            "contract",
            "--description",
            "Build services",
        ]);
        assert!(result.is_err());
    }
}
