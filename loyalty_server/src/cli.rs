use std::{env, env::VarError};

/// The server takes no arguments. Any argument at all prints the help text and the current configuration.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Only variables that are safe to print. The database URL may carry credentials, so it is not listed.
    const DISPLAY_ENVS: [&str; 8] = [
        "RUST_LOG",
        "LPS_DB_MAX_CONNECTIONS",
        "LPS_RUN_MIGRATIONS",
        "LPS_ACCRUAL_SYSTEM_ADDRESS",
        "LPS_ACCRUAL_REQUEST_TIMEOUT",
        "LPS_POLL_INITIAL_LIMIT",
        "LPS_POLL_TIME_UNIT_MS",
        "LPS_SHUTDOWN_TIMEOUT",
    ];

    println!("Current environment values (EXCLUDING variables that may contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
