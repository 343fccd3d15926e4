//! The human-oriented installation guide (`INSTALL.md`).

use std::path::Path;

use super::markdown::{heredoc, Markdown};
use super::TOKEN_PLACEHOLDER;
use crate::config::ServiceConfig;
use crate::environment::Environment;
use crate::error::Result;
use crate::provision::{ComposeFile, ServiceKind, ServicePlan, COMPOSE_FILE_NAME};
use crate::shell::ShellType;

const ARCHITECTURE: &str = "\
┌──────────────┐     ┌──────────────┐     ┌──────────────┐
│  CLI / UI    │────▶│  API Server  │────▶│  Temporal    │
│  (client)    │     │  (Express)   │     │  (workflow)  │
└──────────────┘     └──────────────┘     └──────┬───────┘
                                                 │
                     ┌──────────────┐     ┌──────▼───────┐
                     │  DynamoDB    │◀────│  Worker      │
                     │  (storage)   │     │  (Python/AI) │
                     └──────────────┘     └──────────────┘
";

/// Render `INSTALL.md` for the detected machine.
///
/// Commands use the configured repositories and ports, and the install
/// instructions for missing tools follow the package managers found.
pub fn generate_guide(env: &Environment, config: &ServiceConfig, install_dir: &Path) -> Result<String> {
    let dir = install_dir.display().to_string();
    let mut md = Markdown::new();

    md.heading(1, "RepoSwarm Local Installation Guide")
        .line(format!("Generated for: **{}/{}**", env.os, env.arch))
        .para(format!("Install directory: `{}`", dir));

    md.heading(2, "Contents")
        .line("1. [Prerequisites](#prerequisites)")
        .line("2. [Temporal Server](#temporal-server)")
        .line("3. [RepoSwarm Worker](#reposwarm-worker)")
        .line("4. [RepoSwarm API Server](#reposwarm-api-server)")
        .line("5. [RepoSwarm UI](#reposwarm-ui)")
        .line("6. [Configuration](#configuration)")
        .para("7. [Verification](#verification)")
        .rule();

    prerequisites(&mut md, env);
    temporal(&mut md, config, &dir)?;
    worker(&mut md, env, config, install_dir, &dir);
    api(&mut md, config, install_dir, &dir);
    ui(&mut md, config, install_dir, &dir);
    configuration(&mut md, config);
    verification(&mut md);

    md.rule().heading(2, "Architecture").code("", ARCHITECTURE);

    Ok(md.finish())
}

fn prerequisites(md: &mut Markdown, env: &Environment) {
    md.heading(2, "Prerequisites");

    let missing = env.missing_deps();
    if missing.is_empty() {
        md.para("✅ All required dependencies are installed.");
    } else {
        md.heading(3, "⚠️ Missing dependencies: install these first");
        for dep in &missing {
            md.line(format!("**{}:**", dep));
            match install_instructions(env, dep) {
                Some(Instructions::Commands(cmd)) => md.code("bash", &cmd),
                Some(Instructions::Link(url)) => md.para(format!("Visit {}", url)),
                None => md.para("Install it with your system package manager."),
            };
        }
    }

    md.heading(3, "Required").list([
        "Docker & Docker Compose (for Temporal)",
        "Node.js 22+ (for API server & UI)",
        "Python 3.11+ (for worker)",
        "Git",
    ]);
    md.heading(3, "Optional").list([
        "AWS CLI (for CodeCommit repo discovery)",
        "Go 1.24+ (for CLI development)",
    ]);
}

/// How to install one missing dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instructions {
    /// Shell commands to run.
    Commands(String),
    /// A page to follow when no package manager fits.
    Link(&'static str),
}

/// Install instructions for `dep` (a name from
/// [`Environment::missing_deps`]) on this machine.
pub fn install_instructions(env: &Environment, dep: &str) -> Option<Instructions> {
    let cmd = |s: &str| Some(Instructions::Commands(s.to_string()));

    if dep.starts_with("docker") {
        return if env.os == "macos" || env.os == "darwin" {
            cmd("brew install --cask docker")
        } else if env.has_apt {
            cmd("curl -fsSL https://get.docker.com | sh")
        } else {
            Some(Instructions::Link("https://docs.docker.com/get-docker/"))
        };
    }

    if dep.starts_with("node") {
        return if env.has_brew {
            cmd("brew install node@22")
        } else {
            cmd("curl -fsSL https://deb.nodesource.com/setup_22.x | sudo -E bash -\nsudo apt-get install -y nodejs")
        };
    }

    if dep.starts_with("python") {
        return if env.has_brew {
            cmd("brew install python@3.12")
        } else if env.has_apt {
            cmd("sudo apt-get install -y python3 python3-venv python3-pip")
        } else {
            Some(Instructions::Link("https://www.python.org/downloads/"))
        };
    }

    if dep == "git" {
        return if env.has_brew {
            cmd("brew install git")
        } else if env.has_apt {
            cmd("sudo apt-get install -y git")
        } else {
            Some(Instructions::Link("https://git-scm.com/downloads"))
        };
    }

    None
}

fn temporal(md: &mut Markdown, config: &ServiceConfig, dir: &str) -> Result<()> {
    let compose = ComposeFile::temporal(config).to_yaml()?;

    let mut script = format!("cd {}\nmkdir -p temporal && cd temporal\n\n", dir);
    script.push_str(&heredoc(COMPOSE_FILE_NAME, &compose));
    script.push_str("\ndocker compose up -d\n");

    md.heading(2, "Temporal Server")
        .para("Temporal orchestrates the investigation workflows.")
        .code("bash", &script)
        .line(format!(
            "Verify: `curl {}` should return JSON.",
            config.temporal_health_url()
        ))
        .para(format!("Temporal UI: {}", config.temporal_ui_url()));
    Ok(())
}

/// Line that activates `.venv` in the user's shell.
pub fn venv_activate(shell: &str) -> &'static str {
    match ShellType::from_executable(shell) {
        ShellType::Fish => "source .venv/bin/activate.fish",
        ShellType::PowerShell => ".venv\\Scripts\\Activate.ps1",
        ShellType::Cmd => ".venv\\Scripts\\activate.bat",
        _ => "source .venv/bin/activate",
    }
}

fn clone_line(repo: &str, kind: ServiceKind) -> String {
    format!("git clone {} {}\ncd {}\n\n", repo, kind.name(), kind.name())
}

fn worker(md: &mut Markdown, env: &Environment, config: &ServiceConfig, install_dir: &Path, dir: &str) {
    let plan = ServicePlan::worker(config, TOKEN_PLACEHOLDER, env.python_program(), install_dir);

    let mut script = format!("cd {}\n", dir);
    script.push_str(&clone_line(&plan.repo_url, plan.kind));
    script.push_str("# Create virtual environment\n");
    script.push_str(&format!("{} -m venv .venv\n", env.python_program()));
    script.push_str(venv_activate(&env.shell));
    script.push_str("\n\n# Install dependencies\npip install -r requirements.txt\n\n");
    script.push_str("# Configure environment\n");
    script.push_str(&heredoc(plan.env_file_name, &plan.env_file.render()));
    script.push_str("\n# Start the worker\npython -m worker.main\n");

    md.heading(2, "RepoSwarm Worker")
        .para("The worker runs AI-powered architecture investigations.")
        .code("bash", &script)
        .para("The worker does not read `.env` on its own. Export the variables (`set -a; source .env; set +a`) before starting it.");
}

fn api(md: &mut Markdown, config: &ServiceConfig, install_dir: &Path, dir: &str) {
    let plan = ServicePlan::api(config, TOKEN_PLACEHOLDER, install_dir);

    let mut script = format!("cd {}\n", dir);
    script.push_str(&clone_line(&plan.repo_url, plan.kind));
    script.push_str("npm install\n\n# Configure environment\n");
    script.push_str(&heredoc(plan.env_file_name, &plan.env_file.render()));
    script.push_str("\n# Build and start\nnpm run build\nnpm start\n");

    md.heading(2, "RepoSwarm API Server")
        .para("REST API that the CLI and UI talk to.")
        .code("bash", &script)
        .para(format!("API will be at: {}", config.api_health_url()));
}

fn ui(md: &mut Markdown, config: &ServiceConfig, install_dir: &Path, dir: &str) {
    let plan = ServicePlan::ui(config, install_dir);

    let mut script = format!("cd {}\n", dir);
    script.push_str(&clone_line(&plan.repo_url, plan.kind));
    script.push_str("npm install\n\n# Configure environment\n");
    script.push_str(&heredoc(plan.env_file_name, &plan.env_file.render()));
    script.push_str(&format!("\nPORT={} npm run dev\n", config.ui_port));

    md.heading(2, "RepoSwarm UI")
        .para("Next.js dashboard for browsing repos, results, and workflows.")
        .code("bash", &script)
        .para(format!("UI will be at: {}", config.ui_url()));
}

fn configuration(md: &mut Markdown, config: &ServiceConfig) {
    let script = format!(
        "reposwarm config set apiUrl {}\nreposwarm config set apiToken {}\nreposwarm status\n",
        config.api_base_url(),
        TOKEN_PLACEHOLDER
    );
    md.heading(2, "Configuration")
        .para("Connect the CLI to your local API server:")
        .code("bash", &script);

    md.heading(3, "DynamoDB")
        .para("RepoSwarm stores repo metadata and investigation results in DynamoDB.")
        .line("**Option A: AWS DynamoDB** (requires AWS credentials)")
        .list([
            "Set `AWS_REGION`, `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` in each `.env`".to_string(),
            format!(
                "Table `{}` must exist (HASH: `repository_name` S, RANGE: `analysis_timestamp` N)",
                config.dynamodb_table
            ),
        ])
        .line("**Option B: DynamoDB Local** (no AWS account needed)")
        .code(
            "bash",
            "docker run -d -p 8000:8000 amazon/dynamodb-local\n# Add to each .env:\n# DYNAMODB_ENDPOINT=http://localhost:8000\n",
        );
}

fn verification(md: &mut Markdown) {
    md.heading(2, "Verification")
        .para("Run these to confirm everything works:")
        .code(
            "bash",
            "# Check API\nreposwarm status\n\n\
             # List repos\nreposwarm repos list\n\n\
             # Discover CodeCommit repos (if AWS configured)\nreposwarm discover\n\n\
             # Trigger investigation\nreposwarm investigate <repo-name>\n\n\
             # Watch it run\nreposwarm watch\n",
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::ToolStatus;
    use std::path::PathBuf;

    fn linux_env() -> Environment {
        Environment {
            os: "linux".into(),
            arch: "x86_64".into(),
            shell: "/bin/bash".into(),
            docker: ToolStatus::found("Docker version 24.0.6"),
            compose: ToolStatus::found("v2.24.5"),
            node: ToolStatus::found("v22.3.0"),
            python: ToolStatus::found("Python 3.12.1"),
            python_program: Some("python3".into()),
            git: ToolStatus::found("git version 2.43.0"),
            has_apt: true,
            ..Default::default()
        }
    }

    fn render(env: &Environment) -> String {
        generate_guide(env, &ServiceConfig::default(), &PathBuf::from("/home/dev/reposwarm")).unwrap()
    }

    #[test]
    fn complete_machine_needs_nothing() {
        let guide = render(&linux_env());
        assert!(guide.starts_with("# RepoSwarm Local Installation Guide\n"));
        assert!(guide.contains("Generated for: **linux/x86_64**"));
        assert!(guide.contains("All required dependencies are installed"));
        assert!(!guide.contains("Missing dependencies"));
    }

    #[test]
    fn missing_tools_get_instructions() {
        let env = Environment {
            docker: ToolStatus::missing(),
            node: ToolStatus::missing(),
            ..linux_env()
        };
        let guide = render(&env);
        assert!(guide.contains("**docker:**"));
        assert!(guide.contains("curl -fsSL https://get.docker.com | sh"));
        assert!(guide.contains("**node (v22+):**"));
        assert!(guide.contains("deb.nodesource.com/setup_22.x"));
    }

    #[test]
    fn sections_use_configured_values() {
        let config = ServiceConfig {
            api_port: 4000,
            ..ServiceConfig::default()
        };
        let guide =
            generate_guide(&linux_env(), &config, &PathBuf::from("/srv/rs")).unwrap();
        assert!(guide.contains("cd /srv/rs\n"));
        assert!(guide.contains("PORT=4000\n"));
        assert!(guide.contains("API will be at: http://localhost:4000/v1/health"));
        assert!(guide.contains("reposwarm config set apiUrl http://localhost:4000/v1"));
        assert!(guide.contains("git clone https://github.com/royosherove/repo-swarm.git worker"));
        assert!(guide.contains("cat > docker-compose.yml << 'EOF'"));
        assert!(guide.contains("temporalio/auto-setup"));
        assert!(guide.contains(&format!("BEARER_TOKEN={}", TOKEN_PLACEHOLDER)));
    }

    #[test]
    fn docker_on_macos_uses_cask() {
        let env = Environment {
            os: "macos".into(),
            ..linux_env()
        };
        assert_eq!(
            install_instructions(&env, "docker"),
            Some(Instructions::Commands("brew install --cask docker".into()))
        );
    }

    #[test]
    fn docker_without_package_manager_links_docs() {
        let env = Environment {
            has_apt: false,
            ..linux_env()
        };
        assert_eq!(
            install_instructions(&env, "docker-compose"),
            Some(Instructions::Link("https://docs.docker.com/get-docker/"))
        );
    }

    #[test]
    fn brew_preferred_for_python() {
        let env = Environment {
            has_brew: true,
            ..linux_env()
        };
        assert_eq!(
            install_instructions(&env, "python3 (3.11+)"),
            Some(Instructions::Commands("brew install python@3.12".into()))
        );
    }

    #[test]
    fn activation_follows_shell() {
        assert_eq!(venv_activate("/usr/bin/fish"), "source .venv/bin/activate.fish");
        assert_eq!(venv_activate("pwsh"), ".venv\\Scripts\\Activate.ps1");
        assert_eq!(venv_activate("/bin/zsh"), "source .venv/bin/activate");
        assert_eq!(venv_activate(""), "source .venv/bin/activate");
    }
}
