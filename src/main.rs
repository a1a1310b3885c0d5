mod ipc;
mod profiles;
mod store;
mod students;

use std::io::{self, BufRead, Write};

use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

fn log_level_from_env() -> log::LevelFilter {
    match std::env::var("REWARDSD_LOG").as_deref() {
        Ok("trace") => log::LevelFilter::Trace,
        Ok("debug") => log::LevelFilter::Debug,
        Ok("info") => log::LevelFilter::Info,
        Ok("error") => log::LevelFilter::Error,
        Ok("off") => log::LevelFilter::Off,
        _ => log::LevelFilter::Warn,
    }
}

fn main() {
    // Diagnostics go to stderr; stdout carries the IPC responses.
    let log_cfg = ConfigBuilder::new().add_filter_allow_str("rewardsd").build();
    let _ = TermLogger::init(
        log_level_from_env(),
        log_cfg,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let mut state = ipc::AppState {
        workspace: None,
        stores: None,
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id; ignore.
                let _ = writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
