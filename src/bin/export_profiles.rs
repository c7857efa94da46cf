use anyhow::{Context, Result};
use clap::Parser;
use eudefense::profile::Catalogue;
use std::{fs::File, io::Write, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Dump the profile catalogue as YAML, a starting point for `--profiles`.
#[derive(Parser, Debug)]
struct Args {
    /// Output file; stdout when omitted
    #[arg(long)]
    out: Option<PathBuf>,

    /// Merge this override file before exporting
    #[arg(long)]
    profiles: Option<PathBuf>,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut catalogue = Catalogue::builtin()?;
    if let Some(path) = &args.profiles {
        catalogue.merge_file(path)?;
    }
    let yaml = catalogue.to_yaml()?;

    match &args.out {
        Some(path) => {
            let mut f = File::create(path).with_context(|| format!("creating {:?}", path))?;
            f.write_all(yaml.as_bytes())
                .with_context(|| format!("writing {:?}", path))?;
            info!(path = %path.display(), profiles = catalogue.names().len(), "catalogue exported");
        }
        None => print!("{}", yaml),
    }
    Ok(())
}
