mod details;
mod failure;
mod tables;

use atty::Stream;
use color_eyre::Result;
use venvx_core::api as venvx_core;
use venvx_core::{CommandInfo, CommandStatus, ExecutionOutcome};

use crate::style::Style;

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub quiet: bool,
    pub json: bool,
    pub no_color: bool,
}

pub fn exit_code(status: &CommandStatus) -> i32 {
    match status {
        CommandStatus::Ok => 0,
        CommandStatus::UserError => 1,
        CommandStatus::Failure => 2,
    }
}

pub fn emit_output(
    opts: &OutputOptions,
    info: CommandInfo,
    outcome: &ExecutionOutcome,
) -> Result<i32> {
    let code = exit_code(&outcome.status);

    if opts.json {
        let payload = venvx_core::to_json_response(info, outcome, code);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }

    let style_out = Style::new(opts.no_color, atty::is(Stream::Stdout));
    let style_err = Style::new(opts.no_color, atty::is(Stream::Stderr));

    match outcome.status {
        CommandStatus::Ok => {
            if opts.quiet {
                return Ok(code);
            }
            let message = venvx_core::format_status_message(info, &outcome.message);
            println!("{}", style_out.status(&outcome.status, &message));
            for line in details::body_lines(&style_out, info, &outcome.details) {
                println!("{line}");
            }
            if let Some(hint) = details::hint_from_details(&outcome.details) {
                println!("{}", style_out.info(&format!("Tip: {hint}")));
            }
        }
        CommandStatus::UserError | CommandStatus::Failure => {
            let header = format!(
                "{}  {}",
                failure::error_code(info),
                venvx_core::format_status_message(info, &outcome.message)
            );
            eprintln!("{}", style_err.error_header(&header));
            // Placeholder views still explain the empty state on failure.
            for line in details::body_lines(&style_err, info, &outcome.details) {
                eprintln!("{line}");
            }
            eprintln!();
            eprintln!("Why:");
            for reason in failure::collect_why_bullets(&outcome.details, &outcome.message) {
                eprintln!("  • {reason}");
            }
            let fixes = failure::collect_fix_bullets(&outcome.details);
            if !fixes.is_empty() {
                eprintln!();
                eprintln!("Fix:");
                for fix in fixes {
                    eprintln!("{}", style_err.fix_bullet(&format!("  • {fix}")));
                }
            }
            if let Some(stderr) = details::output_from_details(&outcome.details, "stderr") {
                eprintln!();
                eprintln!("stderr:");
                eprintln!("{stderr}");
            } else if let Some(stdout) = details::output_from_details(&outcome.details, "stdout") {
                eprintln!();
                eprintln!("stdout:");
                eprintln!("{stdout}");
            }
        }
    }

    Ok(code)
}
