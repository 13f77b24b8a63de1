use std::{env, fs, path, time::Instant};

use dotenv::dotenv;
use futures_util::future::join_all;
use mcserverinfo::{
    OnlineMode, ServerQuery,
    config::{Config, QueryConfig},
    terminal_colors::*,
    tracing::init_tracing,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();

    // first command line argument is the location of the config file
    let args = env::args().collect::<Box<[String]>>();
    let config_file = args.get(1).cloned().unwrap_or("config.toml".to_string());

    let config_file_path = path::Path::new(&config_file).canonicalize()?;
    let config: Config = toml::from_str(&fs::read_to_string(config_file_path)?)?;

    init_tracing(&config);
    info!("Logging initialized");

    if config.targets.is_empty() {
        println!("no targets in {config_file}, nothing to do");
        return Ok(());
    }

    let start_time = Instant::now();
    let check_online_mode = config.check_online_mode;
    let lines = join_all(
        config
            .targets
            .into_iter()
            .map(|target| check_target(target, check_online_mode)),
    )
    .await;
    for line in lines {
        println!("{line}");
    }

    info!("Checked all targets in {:?}", start_time.elapsed());
    Ok(())
}

/// Query a single server and describe the result in one line.
async fn check_target(target: QueryConfig, check_online_mode: bool) -> String {
    let name = format!("{}:{}", target.address, target.port);
    let query = ServerQuery::new(target);

    if !query.is_reachable().await {
        return format!("{RED}{BOLD}{name}{RESET} {RED}unreachable{RESET}");
    }

    let status = match query.status().await {
        Ok(status) => status,
        Err(err) => return format!("{YELLOW}{BOLD}{name}{RESET} {YELLOW}{err}{RESET}"),
    };

    let mut line = format!(
        "{GREEN}{BOLD}{name}{RESET} {} {GRAY}({}){RESET} {BLUE}{}/{}{RESET} {:?}",
        status.version.name,
        status.version.protocol,
        status.players.online,
        status.players.max,
        status.description_plaintext(),
    );

    if check_online_mode && query.config().probe_username.is_some() {
        let online_mode = query.is_encrypted(Some(&status)).await.unwrap_or_else(|err| {
            warn!("{name}: {err}");
            OnlineMode::Unknown
        });
        line.push(' ');
        line.push_str(&online_mode_label(online_mode, status.sample_online_mode_hint()));
    }

    line
}

/// The login result is what gets reported. The player sample is only a guess,
/// so it's shown next to an unknown result instead of replacing it.
fn online_mode_label(online_mode: OnlineMode, sample_hint: OnlineMode) -> String {
    match (online_mode, sample_hint) {
        (OnlineMode::Unknown, OnlineMode::Unknown) => format!("{BOLD}unknown mode{RESET}"),
        (OnlineMode::Unknown, hint) => {
            format!("{BOLD}unknown mode{RESET} {GRAY}(player sample suggests {hint}){RESET}")
        }
        (online_mode, _) => format!("{BOLD}{online_mode} mode{RESET}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_mode_label() {
        assert_eq!(
            online_mode_label(OnlineMode::Offline, OnlineMode::Online),
            format!("{BOLD}offline mode{RESET}")
        );
        assert_eq!(
            online_mode_label(OnlineMode::Online, OnlineMode::Unknown),
            format!("{BOLD}online mode{RESET}")
        );
        assert_eq!(
            online_mode_label(OnlineMode::Unknown, OnlineMode::Unknown),
            format!("{BOLD}unknown mode{RESET}")
        );
    }

    #[test]
    fn test_sample_hint_does_not_replace_unknown() {
        let label = online_mode_label(OnlineMode::Unknown, OnlineMode::Offline);
        assert!(label.starts_with(&format!("{BOLD}unknown mode{RESET}")), "{label}");
        assert!(label.contains("player sample suggests offline"), "{label}");
        assert!(!label.contains("offline mode"), "{label}");
    }
}
