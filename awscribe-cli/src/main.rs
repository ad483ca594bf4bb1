mod logging;

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use awscribe::{
    AwsTranscribeService, Ffmpeg, JobOptions, JobOutcome, LanguageCode, Pipeline, S3Store,
};

#[derive(Parser, Debug)]
#[command(
    name = "transcribe",
    about = "Transcribe audio via AWS. If a job already exists, provides a status update."
)]
struct Cli {
    /// Audio file to transcribe.
    #[arg(required_unless_present = "list_languages")]
    audio_file: Option<PathBuf>,

    /// S3 bucket name.
    #[arg(required_unless_present = "list_languages")]
    bucket: Option<String>,

    /// S3 key for the audio file (default: the converted file's name).
    #[arg(short, long)]
    key: Option<String>,

    /// Language code.
    #[arg(short, long, default_value = "en-US")]
    language: LanguageCode,

    /// Transcription job name (default: the audio file's stem).
    #[arg(short, long)]
    job: Option<String>,

    /// Filename for the downloaded transcript (will have a .json suffix).
    #[arg(short, long)]
    outfile: Option<PathBuf>,

    /// Print the transcript once the job is complete.
    #[arg(short, long = "print_result", visible_alias = "print-result")]
    print_result: bool,

    /// Verbose (debug) logging.
    #[arg(short, long)]
    verbose: bool,

    /// AWS region (default: from the AWS environment or profile).
    #[arg(long)]
    region: Option<String>,

    /// ffmpeg binary used for format conversion.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// List supported language codes.
    #[arg(long)]
    list_languages: bool,
}

impl Cli {
    fn job_options(&self) -> JobOptions {
        let mut opts = JobOptions::new()
            .language(self.language)
            .print_result(self.print_result);
        if let Some(key) = &self.key {
            opts = opts.key(key);
        }
        if let Some(job) = &self.job {
            opts = opts.job_name(job);
        }
        if let Some(outfile) = &self.outfile {
            opts = opts.outfile(outfile);
        }
        opts
    }
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    logging::init(cli.verbose);

    if cli.list_languages {
        for code in LanguageCode::supported() {
            println!("{code}");
        }
        return;
    }

    let (Some(audio_file), Some(bucket)) = (&cli.audio_file, &cli.bucket) else {
        error!("audio_file and bucket are required");
        std::process::exit(1);
    };

    let options = cli.job_options();
    let sdk_config = awscribe::aws::load_sdk_config(cli.region.clone()).await;
    let encoder = Ffmpeg::new(&cli.ffmpeg);
    let store = S3Store::new(&sdk_config);
    let service = AwsTranscribeService::new(&sdk_config);

    let outcome = match Pipeline::new(&encoder, &store, &service)
        .run(audio_file, bucket, &options)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{e}");
            std::process::exit(e.exit_code());
        }
    };

    report(&outcome);
    let code = outcome.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
}

fn report(outcome: &JobOutcome) {
    match outcome {
        JobOutcome::Completed {
            text: Some(text), ..
        } => info!("{text}"),
        JobOutcome::Failed { reason } => error!(
            "transcription job failed: {}",
            reason.as_deref().unwrap_or("no reason given")
        ),
        JobOutcome::Submitted { .. } | JobOutcome::Pending { .. } => {
            info!("Run again later to check on the job")
        }
        JobOutcome::Completed { text: None, .. } => {}
    }
}
