use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eurofxref::{Config, RateService, convert_input};

/// ECB euro reference rates, cached locally.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every currency and its rate against EUR.
    List,
    /// Convert an amount between two currencies.
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    /// Download the feed now, even if the cache is fresh.
    Refresh,
    /// Show the cached publication moment without downloading.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let rates = RateService::from_config(&config)?;

    match cli.command {
        Command::List => {
            let table = rates.current_table().await.context("Can't load rates")?;
            println!("Rates published {}:", table.published_at());
            for (code, rate) in table.iter() {
                println!("{}: {}", code, rate);
            }
        }
        Command::Convert { amount, from, to } => {
            let table = rates.current_table().await.context("Can't load rates")?;
            let (from, to) = (from.to_uppercase(), to.to_uppercase());

            let result = convert_input(&table, &amount, &from, &to).context("Bad value")?;
            println!("{} {}", result, to);
        }
        Command::Refresh => {
            let document = rates.cache().refresh().await.context("Can't refresh rates")?;
            let table = rates.cache().parser().parse(&document)?;
            println!(
                "Fetched {} rates published {}",
                table.len(),
                table.published_at()
            );
        }
        Command::Status => match rates.cache().cached_published_at().await? {
            Some(published_at) => println!(
                "{}: published {} ({})",
                rates.cache().path().display(),
                published_at,
                rates.cache().freshness(published_at)
            ),
            None => println!("{}: not cached", rates.cache().path().display()),
        },
    }

    Ok(())
}
