use std::process::Command;

use serde::Serialize;

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        platform_fifo_check(),
        gpg_binary_check(),
        gnupghome_check(&args),
        download_dir_writable_check(),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let overall = if has_fail { "fail" } else { "pass" };

    let output = DoctorOutput { checks, overall };
    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("skyfeed doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<22} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
    }
}

fn platform_fifo_check() -> CheckResult {
    #[cfg(unix)]
    {
        CheckResult {
            name: "platform_fifo".to_string(),
            status: CheckStatus::Pass,
            detail: "named pipes (FIFO) available".to_string(),
        }
    }

    #[cfg(not(unix))]
    {
        CheckResult {
            name: "platform_fifo".to_string(),
            status: CheckStatus::Fail,
            detail: "named pipe input source requires a Unix platform".to_string(),
        }
    }
}

fn gpg_binary_check() -> CheckResult {
    match Command::new("gpg").arg("--version").output() {
        Ok(output) if output.status.success() => {
            let first_line = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("gpg")
                .to_string();
            CheckResult {
                name: "gpg_binary".to_string(),
                status: CheckStatus::Pass,
                detail: first_line,
            }
        }
        Ok(output) => CheckResult {
            name: "gpg_binary".to_string(),
            status: CheckStatus::Fail,
            detail: format!("gpg --version exited with {}", output.status),
        },
        Err(err) => CheckResult {
            name: "gpg_binary".to_string(),
            status: CheckStatus::Fail,
            detail: format!("gpg not runnable: {err} (required unless --plaintext)"),
        },
    }
}

fn gnupghome_check(args: &DoctorArgs) -> CheckResult {
    if args.gnupghome.is_dir() {
        CheckResult {
            name: "gnupghome".to_string(),
            status: CheckStatus::Pass,
            detail: format!("{} exists", args.gnupghome.display()),
        }
    } else {
        CheckResult {
            name: "gnupghome".to_string(),
            status: CheckStatus::Warn,
            detail: format!(
                "{} not found; decryption will miss every message",
                args.gnupghome.display()
            ),
        }
    }
}

fn download_dir_writable_check() -> CheckResult {
    let dir = std::env::temp_dir().join(format!(
        "skyfeed-doctor-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default()
    ));

    let result = std::fs::create_dir_all(&dir)
        .and_then(|()| std::fs::write(dir.join("probe"), b"skyfeed"));
    let _ = std::fs::remove_dir_all(&dir);

    match result {
        Ok(()) => CheckResult {
            name: "download_dir_writable".to_string(),
            status: CheckStatus::Pass,
            detail: "temp directory write succeeded".to_string(),
        },
        Err(err) => CheckResult {
            name: "download_dir_writable".to_string(),
            status: CheckStatus::Fail,
            detail: format!("temp directory write failed: {err}"),
        },
    }
}
