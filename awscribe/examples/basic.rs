//! Run one pass over a local audio file and print what happened.
//!
//! Usage: cargo run --example basic -- path/to/audio.wav my-bucket

use awscribe::{AwsTranscribeService, Ffmpeg, JobOptions, JobOutcome, Pipeline, S3Store};

#[tokio::main]
async fn main() -> awscribe::Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args.next().expect("usage: basic <audio-file> <bucket>");
    let bucket = args.next().expect("usage: basic <audio-file> <bucket>");

    let sdk_config = awscribe::aws::load_sdk_config(None).await;
    let encoder = Ffmpeg::default();
    let store = S3Store::new(&sdk_config);
    let service = AwsTranscribeService::new(&sdk_config);

    let outcome = Pipeline::new(&encoder, &store, &service)
        .run(path.as_ref(), &bucket, &JobOptions::new().print_result(true))
        .await?;

    match outcome {
        JobOutcome::Completed { text: Some(text), .. } => println!("{text}"),
        other => println!("{other:?}"),
    }

    Ok(())
}
