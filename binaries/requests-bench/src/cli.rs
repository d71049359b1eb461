use std::time::Duration;

use bench_harness::{BenchConfig, Strategy};
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "requests-bench")]
#[command(about = "Times the same batch of GET requests three different ways")]
pub struct Cli {
    /// Hide progress bars; result lines are still printed
    #[arg(short, long)]
    pub quiet: bool,

    /// Per-request timeout in seconds. Without it a stalled request blocks
    /// its strategy forever.
    #[arg(long, value_name = "SECONDS", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Run only the given strategies (repeatable). Order stays fixed.
    #[arg(long, value_enum)]
    pub only: Vec<StrategyArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    NoSession,
    Session,
    Concurrent,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::NoSession => Strategy::WithoutSession,
            StrategyArg::Session => Strategy::WithSession,
            StrategyArg::Concurrent => Strategy::Concurrent,
        }
    }
}

impl Cli {
    pub fn strategies(&self) -> Vec<Strategy> {
        if self.only.is_empty() {
            Strategy::ALL.to_vec()
        } else {
            self.only.iter().copied().map(Strategy::from).collect()
        }
    }

    pub fn bench_config(
        &self, target_url: &str, request_count: usize,
    ) -> BenchConfig {
        BenchConfig {
            target_url: target_url.to_string(),
            request_count,
            request_timeout: self.timeout,
        }
    }
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err("timeout must be a positive number of seconds".to_string());
    }

    Ok(Duration::from_secs_f64(seconds))
}
