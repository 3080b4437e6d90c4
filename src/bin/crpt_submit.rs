//! crpt-submit: submit documents to the CRPT registry from the command line.
//!
//! Usage:
//!   crpt-submit [--config <file.yaml>] [--signature <value>] <document.json>...
//!
//! All documents are submitted concurrently through one client, so the
//! configured request limit applies across them.

use anyhow::{bail, Context};
use crpt_client::{ClientConfig, CrptClientBuilder, Document, Signature};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct Args {
    config: Option<PathBuf>,
    signature: Option<String>,
    documents: Vec<PathBuf>,
}

fn print_usage() {
    println!(
        r#"crpt-submit: submit documents to the CRPT registry

USAGE:
    crpt-submit [OPTIONS] <document.json>...

OPTIONS:
    --config <file.yaml>    Client configuration (request limit, window, retries)
    --signature <value>     Base64 signature sent in the Signature header
    -h, --help              Show this help message

ENVIRONMENT:
    CRPT_SIGNATURE          Signature, if --signature is not given
    CRPT_REQUEST_LIMIT      Requests per window (overrides the config file)
    CRPT_WINDOW_SECS        Window length in seconds
    CRPT_BASE_URL           Registry base URL
    RUST_LOG                Log filter, e.g. "info" or "crpt_client=debug""#
    );
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut args = Args {
        config: None,
        signature: None,
        documents: Vec::new(),
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--signature" => {
                args.signature = Some(iter.next().context("--signature needs a value")?);
            }
            other if other.starts_with("--") => bail!("unknown option: {other}"),
            other => args.documents.push(PathBuf::from(other)),
        }
    }
    if args.documents.is_empty() {
        return Ok(None);
    }
    Ok(Some(args))
}

fn load_document(path: &Path) -> anyhow::Result<Document> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Some(args) = parse_args()? else {
        print_usage();
        std::process::exit(1);
    };

    let builder = match &args.config {
        Some(path) => {
            CrptClientBuilder::new().config(ClientConfig::from_file(path)?.with_env_overrides())
        }
        None => CrptClientBuilder::from_env(),
    };

    let signature = args
        .signature
        .or_else(|| std::env::var("CRPT_SIGNATURE").ok())
        .map(Signature::new)
        .context("no signature: pass --signature or set CRPT_SIGNATURE")?;

    let documents = args
        .documents
        .iter()
        .map(|p| load_document(p).map(|d| (p.clone(), d)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let client = Arc::new(builder.build()?);

    let results = join_all(documents.iter().map(|(path, doc)| {
        let client = client.clone();
        let signature = signature.clone();
        async move { (path, client.submit(doc, signature).await) }
    }))
    .await;

    client.shutdown();

    let mut failed = 0;
    for (path, result) in results {
        match result {
            Ok(stats) => println!(
                "{}: accepted (HTTP {}, {} attempt(s), {} ms)",
                path.display(),
                stats.http_status,
                stats.attempts,
                stats.duration_ms
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} document(s) failed", documents.len());
    }
    Ok(())
}
