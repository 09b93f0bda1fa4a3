use anyhow::Result;
use avatarsynth::config::{Config, Credentials, Region};
use avatarsynth::synthesis::{
    wait_for_completion, AzureAvatarClient, ClientError, JobEvent, PollOutcome,
    SynthesisJobClient, WaitOptions,
};
use avatarsynth::version;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::fs::File;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter, warn};

#[derive(Parser, Debug)]
#[command(version = version::get_version_info(), about = "Batch avatar video synthesis client")]
struct Cli {
    /// Path to an optional TOML config file
    #[clap(long)]
    conf: Option<String>,

    /// Service region hosting the speech resource
    #[clap(long, value_enum)]
    region: Option<Region>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a synthesis job and wait for the download URL
    Submit {
        /// Text to synthesize into an avatar video
        text: String,

        /// Return right after submission instead of waiting for completion
        #[clap(long)]
        no_wait: bool,

        /// Give up waiting after this many seconds
        #[clap(long)]
        timeout: Option<u64>,

        /// Seconds between status checks
        #[clap(long)]
        interval: Option<u64>,
    },
    /// Fetch the current status of a job
    Status {
        /// Job id returned by submit
        job_id: String,
    },
    /// List previously submitted jobs
    List {
        /// Number of jobs to skip
        #[clap(long, default_value = "0")]
        skip: u32,

        /// Maximum number of jobs to return
        #[clap(long, default_value = "100")]
        top: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let config = cli
        .conf
        .as_deref()
        .map(|conf| Config::load(conf).expect("Failed to load config"))
        .unwrap_or_default();

    let mut log_fmt = tracing_subscriber::fmt();
    if let Some(ref level) = config.log_level {
        if let Ok(lv) = level.as_str().parse::<LevelFilter>() {
            log_fmt = log_fmt.with_max_level(lv);
        }
    }

    let mut _appender_guard = None;
    if let Some(ref log_file) = config.log_file {
        let file = File::create(log_file).expect("Failed to create log file");
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        _appender_guard = Some(guard);
        log_fmt.with_writer(non_blocking).try_init().ok();
    } else {
        log_fmt.try_init().ok();
    }

    let region = match cli.region.or(config.region) {
        Some(region) => region,
        None => match std::env::var("AVATAR_REGION") {
            Ok(value) if !value.is_empty() => value.parse()?,
            _ => {
                eprintln!("Error: no region configured.");
                eprintln!("Pass --region, set it in the config file, or set AVATAR_REGION.");
                return Err(anyhow::anyhow!("Missing region"));
            }
        },
    };

    let subscription_key = match std::env::var("AVATAR_SUBSCRIPTION_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => {
            eprintln!("Error: AVATAR_SUBSCRIPTION_KEY environment variable not set or empty.");
            eprintln!("Please set it in .env file or in your environment.");
            return Err(anyhow::anyhow!("Missing AVATAR_SUBSCRIPTION_KEY"));
        }
    };

    let client = AzureAvatarClient::new(Credentials {
        subscription_key,
        region,
    });

    match cli.command {
        Commands::Submit {
            text,
            no_wait,
            timeout,
            interval,
        } => {
            let job_id = client.submit(&text).await?;
            println!("Job submitted successfully. Job ID: {}", job_id);
            if no_wait {
                return Ok(());
            }

            let interval_secs = interval.or(config.poll_interval_secs).unwrap_or(5);
            let options = WaitOptions {
                poll_interval: Duration::from_secs(interval_secs),
                timeout: timeout
                    .or(config.wait_timeout_secs)
                    .map(Duration::from_secs),
            };

            let cancel_token = CancellationToken::new();
            let ctrl_c_token = cancel_token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Received CTRL+C, stopping wait");
                    ctrl_c_token.cancel();
                }
            });

            let (event_tx, mut event_rx) = mpsc::unbounded_channel();
            let printer = tokio::spawn(async move {
                while let Some(event) = event_rx.recv().await {
                    if let JobEvent::Status { status, .. } = event {
                        println!(
                            "Job status: {}. Checking again in {} seconds...",
                            status, interval_secs
                        );
                    }
                }
            });

            println!("Waiting for job completion...");
            let result =
                wait_for_completion(&client, &job_id, &options, &cancel_token, Some(&event_tx))
                    .await;
            drop(event_tx);
            printer.await.ok();

            match result {
                Ok(url) => println!("Job succeeded! Download your video here: {}", url),
                Err(ClientError::JobFailed { .. }) => {
                    eprintln!("Job failed.");
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Status { job_id } => match client.poll(&job_id).await? {
            PollOutcome::Succeeded(url) => println!("Job succeeded! Download URL: {}", url),
            PollOutcome::Failed => println!("Job failed."),
            PollOutcome::Pending(status) => println!("Job status: {}", status),
        },
        Commands::List { skip, top } => {
            // A listing failure renders as an empty page rather than an
            // error, matching how the service UI treats it.
            let jobs = match client.list(skip, top).await {
                Ok(jobs) => jobs,
                Err(e) => {
                    warn!("failed to list batch synthesis jobs: {}", e);
                    Vec::new()
                }
            };

            if jobs.is_empty() {
                println!("No avatar video jobs exist");
            } else {
                println!("Total jobs: {}", jobs.len());
                for job in &jobs {
                    println!(
                        "  {}  {}  {}",
                        job.id,
                        job.status,
                        job.created_date_time.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }

    Ok(())
}
