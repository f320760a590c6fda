// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use tron_wallet_cli::{cli, config, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    config::load_dotenv();
    logging::init_logging();

    cli::wallet::main_entry().await
}
