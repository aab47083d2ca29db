// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use drone_talk_notify::config::Environment;
use drone_talk_notify::logging::init_tracing;
use drone_talk_notify::notify;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let env = Environment::capture();
    init_tracing(&env);

    println!("Starting drone to talk message!");

    match notify(&env).await {
        Ok(status) => {
            println!(
                "Message sent successfully with status code: {}",
                status.as_u16()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = e.kind(), "Notification failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
