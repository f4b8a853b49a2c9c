//! Raw command passthrough.

use riverlink_core::Controller;

use crate::cli::{GlobalOpts, RawArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    controller: &Controller,
    args: RawArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let line = args.line.join(" ");
    tracing::debug!(line = %line, "raw command");
    let body = controller.execute_raw(&line).await?;
    let out = output::render_value(&global.output, &body);
    output::print_output(&out, global.quiet);
    Ok(())
}
