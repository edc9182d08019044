//! kata doctor - Health checks and repairs

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputMode, emit_human, emit_robot, robot_ok};
use crate::error::{KataError, Result};

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Attempt to fix issues automatically
    #[arg(long)]
    pub fix: bool,
}

#[derive(Debug, Serialize)]
struct Check {
    name: &'static str,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

impl CheckStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

pub fn run(ctx: &AppContext, args: &DoctorArgs) -> Result<()> {
    let checks = vec![
        check_store(ctx),
        check_python(ctx),
        check_upstream(ctx),
        check_config(ctx, args.fix)?,
    ];

    let failed = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Fail)
        .count();

    match ctx.output_mode {
        OutputMode::Robot => emit_robot(&robot_ok(serde_json::json!({
            "checks": checks,
            "failed": failed,
        })))?,
        OutputMode::Human => {
            let mut layout = HumanLayout::new();
            layout.section("Checks");
            for check in &checks {
                layout.kv(check.name, &format!("{:<5} {}", check.status.as_str(), check.detail));
            }
            emit_human(layout);
        }
    }

    if failed > 0 {
        return Err(KataError::Config(format!("{failed} check(s) failed")));
    }
    Ok(())
}

fn check_store(ctx: &AppContext) -> Check {
    match ctx.store.top_standings(1) {
        Ok(_) => Check {
            name: "store",
            status: CheckStatus::Ok,
            detail: ctx.kata_root.join("kata.db").display().to_string(),
        },
        Err(err) => Check {
            name: "store",
            status: CheckStatus::Fail,
            detail: err.to_string(),
        },
    }
}

fn check_python(ctx: &AppContext) -> Check {
    let bin = &ctx.config.judge.python_bin;
    match which::which(bin) {
        Ok(path) => Check {
            name: "python",
            status: CheckStatus::Ok,
            detail: path.display().to_string(),
        },
        Err(_) => Check {
            name: "python",
            status: CheckStatus::Fail,
            detail: format!("{bin} not found on PATH; submissions cannot run"),
        },
    }
}

fn check_upstream(ctx: &AppContext) -> Check {
    match &ctx.config.upstream.base_url {
        Some(url) => Check {
            name: "upstream",
            status: CheckStatus::Ok,
            detail: url.clone(),
        },
        None => Check {
            name: "upstream",
            status: CheckStatus::Warn,
            detail: "base_url not configured; the built-in question will serve".to_string(),
        },
    }
}

fn check_config(ctx: &AppContext, fix: bool) -> Result<Check> {
    if ctx.config_path.exists() {
        return Ok(Check {
            name: "config",
            status: CheckStatus::Ok,
            detail: ctx.config_path.display().to_string(),
        });
    }

    if fix {
        if let Some(parent) = ctx.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(&crate::config::Config::default())
            .map_err(|err| KataError::Config(format!("render default config: {err}")))?;
        std::fs::write(&ctx.config_path, rendered)?;
        return Ok(Check {
            name: "config",
            status: CheckStatus::Ok,
            detail: format!("wrote defaults to {}", ctx.config_path.display()),
        });
    }

    Ok(Check {
        name: "config",
        status: CheckStatus::Warn,
        detail: format!("{} not found; defaults in effect", ctx.config_path.display()),
    })
}
