//! Command implementations.
//!
//! Every tool-backed command opens one session, runs the client init where
//! the generation needs it, performs its operation and closes the session.

use clap::CommandFactory;
use clap_complete::{generate, Shell as CompletionShell};
use tracing::debug;

use crate::cli::{output, Cli, Command, Shell, TemplateArgs};
use crate::core::command::TemplateOptions;
use crate::core::config::Settings;
use crate::core::profile::ToolProfile;
use crate::core::session::Session;
use crate::error::Result;

/// Execute a parsed command line.
pub fn execute(cli: Cli) -> Result<()> {
    if let Command::Completions { shell } = cli.command {
        return completions(shell);
    }

    let settings = settings(&cli)?;
    let mut session = Session::open(&cli.workdir, &settings)?;
    let result = run(&mut session, cli.command);
    session.close();
    result
}

/// Settings file merged with command-line overrides.
fn settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::discover(cli.config.as_deref())?;
    if let Some(binary) = &cli.binary {
        settings.binary = binary.clone();
    }
    if cli.generation.is_some() {
        settings.generation = cli.generation;
    }
    debug!(?settings, "effective settings");
    Ok(settings)
}

fn run(session: &mut Session, command: Command) -> Result<()> {
    match command {
        Command::Version { json } => {
            print_profile(session.profile(), json);
            Ok(())
        }
        Command::RepoAdd { name, url, creds } => {
            let creds = creds.load()?;
            session.init()?;
            output::raw(&session.repo_add(&name, &url, &creds)?);
            output::success(&format!("added repository {}", name));
            Ok(())
        }
        Command::RepoUpdate => {
            session.init()?;
            output::raw(&session.repo_update()?);
            Ok(())
        }
        Command::Fetch {
            repo,
            chart,
            destination,
            version,
            creds,
        } => {
            let creds = creds.load()?;
            session.init()?;
            output::raw(&session.fetch(&repo, &chart, &version, &destination, &creds)?);
            output::success(&format!("fetched {} into {}", chart, destination));
            Ok(())
        }
        Command::DependencyBuild => {
            session.init()?;
            output::raw(&session.dependency_build()?);
            Ok(())
        }
        Command::Values { chart } => {
            session.init()?;
            output::raw(&session.inspect_values(&chart)?);
            Ok(())
        }
        Command::Template { chart, opts } => {
            session.init()?;
            output::raw(&session.template(&chart, &template_options(opts))?);
            Ok(())
        }
        // Handled before a session is opened.
        Command::Completions { shell } => completions(shell),
    }
}

fn template_options(args: TemplateArgs) -> TemplateOptions {
    TemplateOptions {
        release_name: args.release,
        namespace: args.namespace,
        kube_version: args.kube_version,
        api_versions: args.api_versions,
        set: args.set.into_iter().collect(),
        set_string: args.set_string.into_iter().collect(),
        set_file: args.set_file.into_iter().collect(),
        values: args.values,
    }
}

fn print_profile(profile: &ToolProfile, json: bool) {
    if json {
        match serde_json::to_string_pretty(profile) {
            Ok(text) => println!("{}", text),
            Err(e) => output::error(&format!("failed to serialize profile: {}", e)),
        }
        return;
    }
    output::header("Tool profile");
    output::kv("generation:", profile.generation);
    output::kv("binary:", &profile.binary_name);
    output::kv("init:", profile.init_supported);
    output::kv("pull:", &profile.pull_command);
    output::kv("show:", &profile.show_command);
    output::kv("name arg:", &profile.template_name_arg);
    output::kv("kube-version:", profile.kube_version_supported);
}

fn completions(shell: Shell) -> Result<()> {
    let target = match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
    };
    generate(target, &mut Cli::command(), "helmgate", &mut std::io::stdout());
    Ok(())
}
