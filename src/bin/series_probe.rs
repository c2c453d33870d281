// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! End-to-end probe against a live Redis.
//!
//! Appends a short synthetic series for one owner, then reads it back once
//! as the owner and once as another caller, and reports what happened.
//!
//! Usage:
//!   ./series_probe                               # Human-readable output
//!   ./series_probe --json                        # JSON output
//!   ./series_probe --url redis://host:6379/0 --owner u1 --minutes 10
//!
//! Logs go to stderr; set `RUST_LOG=minutestore=debug,audit=info` for detail.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use minutestore::access::{RequestContext, SessionTable};
use minutestore::query::{QueryFacade, QueryOutcome, SeriesRequest};
use minutestore::series::{MetricKind, OwnerId, Sample};
use minutestore::storage::{redact_url, RedisStore, RetryingStore, StoreConfig};
use minutestore::time::{Clock, SystemClock, Timestamp};
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "redis://127.0.0.1:6379/0";

struct Options {
    json: bool,
    url: String,
    owner: String,
    minutes: i64,
}

impl Options {
    fn parse() -> Result<Self, String> {
        let mut options = Options {
            json: false,
            url: std::env::var("MINUTESTORE_REDIS_URL").unwrap_or_else(|_| DEFAULT_URL.to_string()),
            owner: "probe-owner".to_string(),
            minutes: 5,
        };

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--json" => options.json = true,
                "--url" => options.url = args.next().ok_or("--url needs a value")?,
                "--owner" => options.owner = args.next().ok_or("--owner needs a value")?,
                "--minutes" => {
                    let value = args.next().ok_or("--minutes needs a value")?;
                    options.minutes = value
                        .parse()
                        .map_err(|_| format!("invalid --minutes value: {}", value))?;
                    if options.minutes <= 0 {
                        return Err("--minutes must be positive".to_string());
                    }
                }
                other => return Err(format!("unknown argument: {}", other)),
            }
        }
        Ok(options)
    }
}

struct Report {
    appended: usize,
    append_ms: f64,
    owner_outcome: QueryOutcome,
    owner_query_ms: f64,
    other_outcome: QueryOutcome,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = match Options::parse() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {}", message);
            return ExitCode::from(2);
        }
    };

    match run(&options).await {
        Ok(report) if options.json => {
            print_json(&options, &report);
            ExitCode::SUCCESS
        }
        Ok(report) => {
            print_human(&options, &report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("probe failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(options: &Options) -> Result<Report, Box<dyn std::error::Error>> {
    let config = StoreConfig::new(options.url.as_str())
        .with_index_key("minutestore:probe:index")
        .with_op_timeout(Duration::from_secs(1));
    let retry = config.retry.clone();
    let redis = RedisStore::open(config)?;
    redis.ping().await?;
    let store = Arc::new(RetryingStore::new(redis, retry)?);

    let facade = QueryFacade::new(store);
    let owner = OwnerId::new(options.owner.as_str());
    let kind = MetricKind::SensorValuesPerMinute;

    let now = SystemClock.now().align_down(kind.resolution());
    let first = now.as_secs() / 60 - options.minutes + 1;

    let started = Instant::now();
    for minute in first..=now.as_secs() / 60 {
        let sample = Sample::new(Timestamp::from_minutes(minute), (minute % 100) as f64);
        facade.repository().append(kind, &owner, sample).await?;
    }
    let append_ms = started.elapsed().as_secs_f64() * 1000.0;

    let sessions = SessionTable::new();
    sessions.insert("probe-owner-token", owner.clone());
    sessions.insert("probe-other-token", OwnerId::new(format!("{}-other", options.owner)));

    let request = SeriesRequest::new(
        options.owner.as_str(),
        kind.name(),
        Timestamp::from_minutes(first).as_secs(),
        now.as_secs() + 60,
    );

    let started = Instant::now();
    let owner_outcome = facade
        .resolve_and_query(&sessions, &RequestContext::with_token("probe-owner-token"), &request)
        .await?;
    let owner_query_ms = started.elapsed().as_secs_f64() * 1000.0;

    let other_outcome = facade
        .resolve_and_query(&sessions, &RequestContext::with_token("probe-other-token"), &request)
        .await?;

    Ok(Report {
        appended: options.minutes as usize,
        append_ms,
        owner_outcome,
        owner_query_ms,
        other_outcome,
    })
}

fn verdict(report: &Report) -> bool {
    let read_back = report
        .owner_outcome
        .samples()
        .is_some_and(|samples| samples.len() == report.appended);
    read_back && report.other_outcome.is_denied()
}

fn print_json(options: &Options, report: &Report) {
    let body = serde_json::json!({
        "url": redact_url(&options.url),
        "owner": options.owner,
        "appended": report.appended,
        "append_ms": report.append_ms,
        "owner_query_ms": report.owner_query_ms,
        "owner_outcome": report.owner_outcome,
        "other_outcome": report.other_outcome,
        "ok": verdict(report),
    });
    match serde_json::to_string_pretty(&body) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to encode report: {}", e),
    }
}

fn print_human(options: &Options, report: &Report) {
    println!("═══════════════════════════════════════════════════════════════");
    println!("  minutestore series probe");
    println!("═══════════════════════════════════════════════════════════════\n");

    println!("  Store:  {}", redact_url(&options.url));
    println!("  Owner:  {}\n", options.owner);

    println!("── Append ──────────────────────────────────────────────────────\n");
    println!("  Samples written: {}", report.appended);
    println!("  Elapsed:         {:.2} ms\n", report.append_ms);

    println!("── Owner Read ──────────────────────────────────────────────────\n");
    match &report.owner_outcome {
        QueryOutcome::Series(samples) => {
            println!("  Samples returned: {}", samples.len());
            for sample in samples {
                println!("    {:>12}  {}", sample.timestamp.as_secs(), sample.value);
            }
        }
        QueryOutcome::Denied => println!("  DENIED (unexpected)"),
    }
    println!("  Elapsed:          {:.2} ms\n", report.owner_query_ms);

    println!("── Foreign Read ────────────────────────────────────────────────\n");
    match &report.other_outcome {
        QueryOutcome::Denied => println!("  Denied as expected"),
        QueryOutcome::Series(samples) => {
            println!("  RETURNED {} SAMPLES (access gate failed)", samples.len())
        }
    }

    println!("\n═══════════════════════════════════════════════════════════════");
    if verdict(report) {
        println!("  Probe OK");
    } else {
        println!("  Probe FAILED");
    }
    println!("═══════════════════════════════════════════════════════════════");
}
