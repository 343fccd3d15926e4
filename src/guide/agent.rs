//! Step-by-step instructions for a coding agent (`REPOSWARM_INSTALL.md`).
//!
//! Each step has a command block and a check that must pass before the
//! next step starts, so an agent can work through it without judgment
//! calls.

use std::path::Path;

use super::install::{install_instructions, venv_activate, Instructions};
use super::markdown::{heredoc, Markdown};
use super::TOKEN_PLACEHOLDER;
use crate::config::ServiceConfig;
use crate::environment::Environment;
use crate::error::Result;
use crate::provision::{ComposeFile, ServicePlan, COMPOSE_FILE_NAME};

struct Step<'a> {
    title: &'a str,
    run: String,
    verify: String,
    on_failure: &'a str,
}

/// Render `REPOSWARM_INSTALL.md`.
pub fn generate_agent_guide(
    env: &Environment,
    config: &ServiceConfig,
    install_dir: &Path,
) -> Result<String> {
    let dir = install_dir.display().to_string();
    let python = env.python_program();
    let mut md = Markdown::new();

    md.heading(1, "Install RepoSwarm Locally")
        .para(format!(
            "You are setting up RepoSwarm on a {}/{} machine in `{}`. \
             Work through the steps in order. Run each step's commands, then its check. \
             Do not continue until the check passes.",
            env.os, env.arch, dir
        ));

    md.heading(2, "Rules").list([
        "Never skip a check.".to_string(),
        format!(
            "Use one token everywhere `{}` appears. Generate it in step 1.",
            TOKEN_PLACEHOLDER
        ),
        "Start long-running services in the background and write their output to the log file named in the step.".to_string(),
        "If a check still fails after two attempts, stop and report the last 30 lines of the log.".to_string(),
    ]);

    let missing = env.missing_deps();
    if !missing.is_empty() {
        md.heading(2, "Step 0: Install missing tools");
        for dep in &missing {
            match install_instructions(env, dep) {
                Some(Instructions::Commands(cmd)) => {
                    md.line(format!("`{}`:", dep)).code("bash", &cmd);
                }
                Some(Instructions::Link(url)) => {
                    md.para(format!("`{}`: ask the user to install it from {}", dep, url));
                }
                None => {
                    md.para(format!("`{}`: install with the system package manager.", dep));
                }
            }
        }
    }

    let compose = ComposeFile::temporal(config).to_yaml()?;
    let api = ServicePlan::api(config, TOKEN_PLACEHOLDER, install_dir);
    let worker = ServicePlan::worker(config, TOKEN_PLACEHOLDER, python, install_dir);
    let ui = ServicePlan::ui(config, install_dir);

    let steps = [
        Step {
            title: "Create the install directory and a token",
            run: format!(
                "mkdir -p {dir}/temporal\ncd {dir}\nopenssl rand -hex 32 > .token\n",
                dir = dir
            ),
            verify: format!("test -s {}/.token && echo ok", dir),
            on_failure: "Use any 64-character hex string as the token.",
        },
        Step {
            title: "Start Temporal",
            run: format!(
                "cd {}/temporal\n{}docker compose up -d\n",
                dir,
                heredoc(COMPOSE_FILE_NAME, &compose)
            ),
            verify: format!("curl -s -o /dev/null -w '%{{http_code}}' {}", config.temporal_health_url()),
            on_failure: "Temporal can take up to a minute on first start. Check `docker compose ps` and `docker compose logs temporal`.",
        },
        Step {
            title: "Install and start the API server",
            run: format!(
                "cd {dir}\ngit clone {repo} api\ncd api\nnpm install\nnpm run build\n{env}nohup npm start > api.log 2>&1 &\n",
                dir = dir,
                repo = api.repo_url,
                env = heredoc(api.env_file_name, &api.env_file.render()),
            ),
            verify: format!("curl -s -o /dev/null -w '%{{http_code}}' {}", config.api_health_url()),
            on_failure: "Read api/api.log. A port conflict means another process owns the API port.",
        },
        Step {
            title: "Install and start the worker",
            run: format!(
                "cd {dir}\ngit clone {repo} worker\ncd worker\n{python} -m venv .venv\n{activate}\npip install -r requirements.txt\n{env}set -a; . ./.env; set +a\nnohup python -m worker.main > worker.log 2>&1 &\n",
                dir = dir,
                repo = worker.repo_url,
                python = python,
                activate = venv_activate(&env.shell),
                env = heredoc(worker.env_file_name, &worker.env_file.render()),
            ),
            verify: "sleep 5 && tail -n 20 worker/worker.log".to_string(),
            on_failure: "The worker is optional. If it keeps failing, note the error and continue.",
        },
        Step {
            title: "Install and start the UI",
            run: format!(
                "cd {dir}\ngit clone {repo} ui\ncd ui\nnpm install\n{env}PORT={port} nohup npm run dev > ui.log 2>&1 &\n",
                dir = dir,
                repo = ui.repo_url,
                env = heredoc(ui.env_file_name, &ui.env_file.render()),
                port = config.ui_port,
            ),
            verify: format!("curl -s -o /dev/null -w '%{{http_code}}' {}/", config.ui_url()),
            on_failure: "The UI is optional. The CLI works without it.",
        },
        Step {
            title: "Point the CLI at the local API",
            run: format!(
                "reposwarm config set apiUrl {}\nreposwarm config set apiToken \"$(cat {}/.token)\"\n",
                config.api_base_url(),
                dir
            ),
            verify: "reposwarm status".to_string(),
            on_failure: "Confirm the token in the CLI config matches BEARER_TOKEN in api/.env.",
        },
    ];

    for (i, step) in steps.iter().enumerate() {
        md.heading(2, &format!("Step {}: {}", i + 1, step.title))
            .code("bash", &step.run)
            .line("Check:")
            .code("bash", &step.verify)
            .para(format!("If the check fails: {}", step.on_failure));
    }

    md.heading(2, "Done when").list([
        format!("`{}` answers with a status below 500", config.temporal_health_url()),
        format!("`{}` answers with a status below 500", config.api_health_url()),
        "`reposwarm status` reports the API as connected".to_string(),
    ]);
    md.para(format!(
        "Replace `{}` with the contents of `.token` in every file you wrote.",
        TOKEN_PLACEHOLDER
    ));

    Ok(md.finish())
}
