use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
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
    // Only non-secret variables go in this list
    const DISPLAY_ENVS: [&str; 14] = [
        "RUST_LOG",
        "SHOP_HOST",
        "SHOP_PORT",
        "SHOP_DATABASE_URL",
        "SHOP_USE_X_FORWARDED_FOR",
        "SHOP_USE_FORWARDED",
        "SHOP_STRIPE_SIGNATURE_CHECKS",
        "SHOP_STRIPE_SIGNATURE_TOLERANCE",
        "SHOP_STRIPE_CURRENCY",
        "SHOP_STRIPE_IP_WHITELIST",
        "SHOP_FREE_DELIVERY_THRESHOLD",
        "SHOP_STANDARD_DELIVERY_PERCENTAGE",
        "SHOP_WEBHOOK_LOOKUP_ATTEMPTS",
        "SHOP_WEBHOOK_LOOKUP_INTERVAL_MS",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
