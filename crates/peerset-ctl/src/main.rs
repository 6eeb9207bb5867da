//! peerset-ctl — load peer lists into a bounded peer set and sample from them.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use peerset::{EventKind, PeerEvent, PeerSet};
use peerset_core::{PeerId, PeerSetConfig};

// ── Peer list files ───────────────────────────────────────────────────────────

/// Parse one base58 peer id per line. Blank lines and `#` comments are skipped.
fn parse_peer_list(text: &str) -> Result<Vec<PeerId>> {
    let mut ids = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let id = line
            .parse::<PeerId>()
            .with_context(|| format!("line {}: invalid peer id {line:?}", n + 1))?;
        ids.push(id);
    }
    Ok(ids)
}

fn read_peer_list(path: &Path) -> Result<Vec<PeerId>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read peer list {}", path.display()))?;
    parse_peer_list(&text).with_context(|| format!("in {}", path.display()))
}

// ── Loading ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
struct LoadSummary {
    read: usize,
    added: usize,
    updated: usize,
}

impl LoadSummary {
    fn dropped(&self) -> usize {
        self.read - self.added - self.updated
    }
}

/// Build a peer set under the configured limit, counting what happened to each id.
fn load_set(ids: Vec<PeerId>, config: &PeerSetConfig) -> (PeerSet<PeerId>, LoadSummary) {
    let mut set = PeerSet::from_config(Vec::new(), &config.registry);

    let added = Rc::new(Cell::new(0usize));
    let updated = Rc::new(Cell::new(0usize));
    {
        let added = added.clone();
        set.on(EventKind::Add, move |event: &PeerEvent<'_, PeerId>| {
            if let PeerEvent::Add(id) = event {
                tracing::debug!(peer = %id, "admitted");
            }
            added.set(added.get() + 1);
        });
        let updated = updated.clone();
        set.on(EventKind::Update, move |_: &PeerEvent<'_, PeerId>| {
            updated.set(updated.get() + 1);
        });
    }

    let read = ids.len();
    set.add(ids);
    let summary = LoadSummary {
        read,
        added: added.get(),
        updated: updated.get(),
    };
    (set, summary)
}

// ── Subcommand handlers ───────────────────────────────────────────────────────

fn cmd_load(config: &PeerSetConfig, file: &Path) -> Result<()> {
    let ids = read_peer_list(file)?;
    let (set, summary) = load_set(ids, config);

    let limit = set
        .limit()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "unlimited".to_string());

    println!("═══════════════════════════════════════");
    println!("  Peer Set ({})", file.display());
    println!("═══════════════════════════════════════");
    println!("  Read       : {}", summary.read);
    println!("  Admitted   : {}", summary.added);
    println!("  Duplicates : {}", summary.updated);
    println!("  Dropped    : {}", summary.dropped());
    println!("  Size/limit : {}/{}", set.len(), limit);

    Ok(())
}

fn cmd_sample(
    config: &PeerSetConfig,
    file: &Path,
    count: Option<usize>,
    exclude: &[PeerId],
    json: bool,
) -> Result<()> {
    let ids = read_peer_list(file)?;
    let (set, _) = load_set(ids, config);

    let count = count.unwrap_or(config.sampling.fanout);
    let sampled: Vec<String> = set
        .sample_excluding(count, exclude)
        .into_iter()
        .map(PeerId::to_base58)
        .collect();
    tracing::info!(requested = count, sampled = sampled.len(), size = set.len(), "sampled peers");

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&sampled).context("failed to encode sample")?
        );
    } else {
        for id in &sampled {
            println!("{id}");
        }
    }
    Ok(())
}

fn cmd_config(config: &PeerSetConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(PeerSetConfig::file_path);
    if PeerSetConfig::write_default_at(&path)? {
        println!("Wrote default config to {}", path.display());
    } else {
        println!("Config already exists at {}", path.display());
    }
    Ok(())
}

fn print_usage() {
    println!("Usage: peerset-ctl [--config <path>] [--limit <n>] <command>");
    println!();
    println!("Commands:");
    println!("  load <file>                    Load peer ids and report admitted/dropped");
    println!("  sample <file> [count]          Sample peers (default count: sampling.fanout)");
    println!("         [--exclude <id>]...     Never return these peers");
    println!("         [--json]                Print a JSON array");
    println!("  config                         Print the effective configuration");
    println!("  config init                    Write the default config file if missing");
    println!();
    println!("Options:");
    println!("  --config <path>   Config file (default: {})", PeerSetConfig::file_path().display());
    println!("  --limit <n>       Override registry.limit (0 = unlimited)");
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Options {
    config_path: Option<PathBuf>,
    limit: Option<usize>,
    exclude: Vec<PeerId>,
    json: bool,
    command: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut opts = Options::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.get(i).context("--config requires a value")?;
                opts.config_path = Some(PathBuf::from(path));
            }
            "--limit" => {
                i += 1;
                opts.limit = Some(
                    args.get(i)
                        .context("--limit requires a value")?
                        .parse()
                        .context("--limit must be a number")?,
                );
            }
            "--exclude" => {
                i += 1;
                let id = args.get(i).context("--exclude requires a peer id")?;
                opts.exclude
                    .push(id.parse().with_context(|| format!("invalid --exclude {id:?}"))?);
            }
            "--json" => opts.json = true,
            other => opts.command.push(other.to_string()),
        }
        i += 1;
    }
    Ok(opts)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = parse_args(&args)?;

    let mut config = match &opts.config_path {
        Some(path) => PeerSetConfig::load_from(path)?,
        None => PeerSetConfig::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            PeerSetConfig::default()
        }),
    };
    if let Some(limit) = opts.limit {
        config.registry.limit = limit;
    }

    let command: Vec<&str> = opts.command.iter().map(String::as_str).collect();
    match command.as_slice() {
        ["load", file] => cmd_load(&config, Path::new(file)),
        ["sample", file] => cmd_sample(&config, Path::new(file), None, &opts.exclude, opts.json),
        ["sample", file, count] => {
            let count = count.parse().context("count must be a number")?;
            cmd_sample(&config, Path::new(file), Some(count), &opts.exclude, opts.json)
        }
        ["config"] => cmd_config(&config),
        ["config", "init"] => cmd_config_init(opts.config_path.as_deref()),
        ["help"] | ["--help"] | ["-h"] | [] => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("unknown command: {}", other.join(" "))
        }
    }
}
