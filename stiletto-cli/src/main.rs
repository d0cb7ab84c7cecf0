use std::process::ExitCode;

use stiletto_cli::CommandRegistry;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    CommandRegistry::with_defaults()
        .run_main(std::env::args_os())
        .await
}
