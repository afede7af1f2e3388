use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use logsink::config::{Config, DEFAULT_CONFIG_FILE, parse_flush_mode};
use logsink::{LogLevel, LogSink, SerialSink};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // 诊断信息走 stderr，永远不会写进日志文件本身
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let sink = SerialSink::new(
        config
            .open_sink()
            .with_context(|| format!("failed to open {}", config.path.display()))?,
    );

    println!("Logging to {}", config.path.display());
    println!("Every line is appended. Commands: !FLUSH | !RM <path> | !MODE <always|manual> | !EXIT");

    let mut input = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        input.clear();

        match io::stdin().read_line(&mut input) {
            Ok(0) => break, // EOF
            Ok(_) => {
                let line = input.trim_end_matches(['\r', '\n']);
                let Some(command) = line.strip_prefix('!') else {
                    sink.log(LogLevel::Info, line);
                    continue;
                };

                let (name, arg) = split_command(command);
                match name.as_str() {
                    "FLUSH" => {
                        sink.flush();
                        println!("OK");
                    }
                    "RM" => {
                        if arg.is_empty() {
                            println!("Usage: !RM <path>");
                        } else {
                            match sink.delete(arg) {
                                Ok(_) => println!("OK"),
                                Err(e) => eprintln!("Error: {}", e),
                            }
                        }
                    }
                    "MODE" if arg.is_empty() => {
                        println!("Current mode: {:?}", sink.flush_mode())
                    }
                    "MODE" => match parse_flush_mode(arg) {
                        Ok(mode) => {
                            sink.set_flush_mode(mode);
                            println!("OK");
                        }
                        Err(e) => eprintln!("Error: {}", e),
                    },
                    "EXIT" => break,
                    _ => println!("Unknown command: {}", name),
                }
            }
            Err(e) => return Err(e).context("failed to read stdin"),
        }
    }

    sink.close();
    Ok(())
}

/// Splits `NAME rest of line` into the upper-cased name and the trimmed rest.
///
/// The rest is kept whole so `!RM` accepts paths containing spaces.
fn split_command(command: &str) -> (String, &str) {
    let command = command.trim();
    match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_uppercase(), rest.trim()),
        None => (command.to_uppercase(), ""),
    }
}
