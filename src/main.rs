use std::process::ExitCode;

use clap::{CommandFactory, Parser, error::ErrorKind};
use nsec3hash::{HashParameters, HashRequest, Nsec3HashConfig, hash_name};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit status for every failure, usage errors included
const FAILURE: u8 = 2;

/// Print the NSEC3 hash of a domain name
///
/// With only a domain, the hash parameters are read from the NSEC3PARAM
/// record of the domain's parent zone.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    override_usage = "nsec3hash [OPTIONS] [@nameserver] <salt> <algorithm> <iterations> <domain>\n       \
                      nsec3hash [OPTIONS] [@nameserver] <domain>"
)]
struct Args {
    /// Enable debugging in the resolver
    #[arg(short, long)]
    debug: bool,

    /// Nameserver to query, same as a positional @nameserver
    #[arg(short, long, value_name = "NAMESERVER")]
    server: Option<String>,

    /// [@nameserver] [<salt> <algorithm> <iterations>] <domain>
    #[arg(value_name = "ARGS", required = true, num_args = 1..)]
    args: Vec<String>,
}

impl Args {
    fn into_request(self) -> HashRequest {
        let mut nameserver = self.server;
        let mut positional = Vec::new();
        for arg in self.args {
            if arg.starts_with('@') {
                nameserver = Some(arg);
            } else {
                positional.push(arg);
            }
        }

        match positional.as_slice() {
            [domain] => HashRequest {
                domain: domain.clone(),
                parameters: None,
                nameserver,
            },
            [salt, algorithm, iterations, domain] => {
                let algorithm = parse_or_exit::<u8>(algorithm, "algorithm");
                let iterations = parse_or_exit::<u16>(iterations, "iterations");
                let parameters = HashParameters::from_presentation(salt, algorithm, iterations)
                    .unwrap_or_else(|e| {
                        Args::command().error(ErrorKind::ValueValidation, e).exit()
                    });
                HashRequest {
                    domain: domain.clone(),
                    parameters: Some(parameters),
                    nameserver,
                }
            }
            _ => Args::command()
                .error(
                    ErrorKind::WrongNumberOfValues,
                    "expected <domain> or <salt> <algorithm> <iterations> <domain>",
                )
                .exit(),
        }
    }
}

fn parse_or_exit<T: std::str::FromStr>(value: &str, what: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        Args::command()
            .error(
                ErrorKind::ValueValidation,
                format!("invalid {}: '{}'", what, value),
            )
            .exit()
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match Nsec3HashConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(FAILURE);
        }
    };
    config.debug |= args.debug;

    let default_filter = if config.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
    debug!("Configuration: {:?}", config);

    let request = args.into_request();
    match hash_name(&request, &config).await {
        Ok(hash) => {
            println!("{}", hash);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(FAILURE)
        }
    }
}
