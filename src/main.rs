use adb_wireless::prelude::*;
use adb_wireless::{locate_tool, workflow, Platform};
use log::warn;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = ctrlc::set_handler(|| {
        println!("\n[!] Operation cancelled by user");
        std::process::exit(1);
    }) {
        warn!("Failed to install interrupt handler: {}", e);
    }

    let outcome = std::panic::catch_unwind(|| {
        let stdin = io::stdin();
        let mut console = Console::new(stdin.lock(), io::stdout());

        console.say("=".repeat(50));
        console.say("ADB Wireless Connection");
        console.say("=".repeat(50));

        workflow::run(
            locate_tool(),
            Platform::current(),
            AdbRunner::new,
            WirelessConfig::default(),
            &mut console,
        )
        .exit_code()
    });

    match outcome {
        Ok(code) => ExitCode::from(code),
        Err(_) => {
            println!("\n[-] Unexpected error, see the message above");
            ExitCode::from(1)
        }
    }
}
